//! MultiMap: single-threaded engine with non-unique keys.
//!
//! Each key owns one bucket: a permanent head node plus a chain of data
//! nodes, newest first. Lookups go through the bucket index, then walk the
//! chain comparing keys and running the caller's predicate.

use crate::bucket_index::BucketIndex;
use crate::chain::Chains;
use crate::error::ExtractError;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Hash map from `K` to any number of `V`s, newest value first per key.
pub struct MultiMap<K, V, S = RandomState> {
    index: BucketIndex<K, S>,
    chains: Chains<K, V>,
}

impl<K, V> MultiMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Pre-size for `capacity` stored values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for MultiMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> MultiMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            index: BucketIndex::with_capacity_and_hasher(capacity, hasher),
            chains: Chains::with_capacity(capacity),
        }
    }

    /// Number of stored values across all buckets.
    pub fn len(&self) -> usize {
        // One head per bucket; every other live node holds a value.
        self.chains.len() - self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets, including buckets whose values were all extracted.
    pub fn bucket_count(&self) -> usize {
        self.index.len()
    }

    /// Store `value` under `key`. It becomes the first match for `key`.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Clone,
    {
        let chains = &mut self.chains;
        let head = self.index.get_or_create(&key, || chains.new_head());
        self.chains.push_front(head, key, value);
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.contains_where(q, |_| true)
    }

    /// True if some value stored under `q` satisfies `pred`.
    pub fn contains_where<Q, F>(&self, q: &Q, pred: F) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnMut(&V) -> bool,
    {
        match self.index.lookup(q) {
            Some(head) => self.chains.find(head, q, pred).is_some(),
            None => false,
        }
    }

    /// Number of values stored under `q`.
    pub fn count_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index
            .lookup(q)
            .map(|head| self.chains.chain_len(head))
            .unwrap_or(0)
    }

    /// Remove and return the most recently inserted value stored under `q`.
    pub fn extract<Q>(&mut self, q: &Q) -> Result<V, ExtractError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.extract_where(q, |_| true)
    }

    /// Remove and return the most recently inserted value stored under `q`
    /// that satisfies `pred`.
    pub fn extract_where<Q, F>(&mut self, q: &Q, pred: F) -> Result<V, ExtractError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnMut(&V) -> bool,
    {
        let Some(head) = self.index.lookup(q) else {
            tracing::debug!("extract: no bucket for key");
            return Err(ExtractError::NotFound);
        };
        let Some(pos) = self.chains.find(head, q, pred) else {
            tracing::debug!("extract: no matching value in bucket");
            return Err(ExtractError::NotFound);
        };
        let (_key, value) = self.chains.unlink(pos).ok_or(ExtractError::NotFound)?;
        Ok(value)
    }
}
