//! Chain: bucket chains stored in a generational arena.
//!
//! Every bucket is a singly linked chain that starts at a payload-less head
//! node. Data nodes carry `(key, value)` and are always spliced in directly
//! after the head, so walking a chain from its head visits the most recently
//! inserted node first. Links are arena keys rather than pointers, so
//! unlinking a node never invalidates any other node.

use core::borrow::Borrow;
use slotmap::{DefaultKey, SlotMap};

/// Arena id of a chain node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct NodeId(DefaultKey);

pub(crate) type Link = Option<NodeId>;

#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Head { next: Link },
    Data { next: Link, key: K, value: V },
}

impl<K, V> Node<K, V> {
    pub(crate) fn next(&self) -> Link {
        match self {
            Node::Head { next } | Node::Data { next, .. } => *next,
        }
    }

    pub(crate) fn set_next(&mut self, link: Link) {
        match self {
            Node::Head { next } | Node::Data { next, .. } => *next = link,
        }
    }
}

/// A matched data node together with the node linking to it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Position {
    pub(crate) prev: NodeId,
    pub(crate) node: NodeId,
}

pub(crate) struct Chains<K, V> {
    slots: SlotMap<DefaultKey, Node<K, V>>,
}

impl<K, V> Chains<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    /// Total live nodes, heads included.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn new_head(&mut self) -> NodeId {
        NodeId(self.slots.insert(Node::Head { next: None }))
    }

    /// Splice a data node directly after `head`.
    pub(crate) fn push_front(&mut self, head: NodeId, key: K, value: V) -> NodeId {
        let next = self.slots.get(head.0).and_then(Node::next);
        debug_assert!(
            matches!(self.slots.get(head.0), Some(Node::Head { .. })),
            "push_front target must be a live head node"
        );
        let id = NodeId(self.slots.insert(Node::Data { next, key, value }));
        if let Some(h) = self.slots.get_mut(head.0) {
            h.set_next(Some(id));
        }
        id
    }

    /// Walk the chain after `head` and return the first data node whose key
    /// equals `q` and whose value satisfies `pred`. Every data node up to and
    /// including the tail is tested.
    pub(crate) fn find<Q, F>(&self, head: NodeId, q: &Q, mut pred: F) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        F: FnMut(&V) -> bool,
    {
        let mut prev = head;
        let mut cursor = self.slots.get(head.0)?.next();
        while let Some(id) = cursor {
            let node = self.slots.get(id.0)?;
            if let Node::Data { key, value, .. } = node {
                if key.borrow() == q && pred(value) {
                    return Some(Position { prev, node: id });
                }
            }
            prev = id;
            cursor = node.next();
        }
        None
    }

    /// Detach the node at `pos`, relinking its predecessor to its successor,
    /// and release its slot. Returns `None` if `pos` is stale.
    pub(crate) fn unlink(&mut self, pos: Position) -> Option<(K, V)> {
        let linked = self.slots.get(pos.prev.0).and_then(Node::next) == Some(pos.node);
        if !linked || !matches!(self.slots.get(pos.node.0), Some(Node::Data { .. })) {
            return None;
        }
        match self.slots.remove(pos.node.0)? {
            Node::Data { next, key, value } => {
                if let Some(prev) = self.slots.get_mut(pos.prev.0) {
                    prev.set_next(next);
                }
                Some((key, value))
            }
            Node::Head { .. } => None,
        }
    }

    /// Number of data nodes following `head`.
    pub(crate) fn chain_len(&self, head: NodeId) -> usize {
        let mut n = 0;
        let mut cursor = self.slots.get(head.0).and_then(Node::next);
        while let Some(id) = cursor {
            n += 1;
            cursor = self.slots.get(id.0).and_then(Node::next);
        }
        n
    }
}
