//! BucketIndex: maps each key to the head node of its chain.
//!
//! Entries are created on the first insertion for a key and never removed.
//! Each entry keeps its precomputed hash, so growing the table never calls
//! back into `K: Hash`.

use crate::chain::NodeId;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table::Entry;
use hashbrown::HashTable;

#[derive(Debug)]
struct Bucket<K> {
    key: K,
    hash: u64,
    head: NodeId,
}

pub(crate) struct BucketIndex<K, S> {
    hasher: S,
    table: HashTable<Bucket<K>>,
}

impl<K, S> BucketIndex<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            table: HashTable::with_capacity(capacity),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Number of buckets ever created.
    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn lookup<Q>(&self, q: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.table
            .find(hash, |b| b.key.borrow() == q)
            .map(|b| b.head)
    }

    /// Return the head for `key`, calling `make_head` to allocate one when the
    /// key has no bucket yet. The key is cloned only in that case.
    pub(crate) fn get_or_create<F>(&mut self, key: &K, make_head: F) -> NodeId
    where
        K: Clone,
        F: FnOnce() -> NodeId,
    {
        let hash = self.make_hash(key);
        let head = match self.table.entry(hash, |b| b.key == *key, |b| b.hash) {
            Entry::Occupied(o) => return o.get().head,
            Entry::Vacant(v) => {
                let head = make_head();
                v.insert(Bucket {
                    key: key.clone(),
                    hash,
                    head,
                });
                head
            }
        };
        tracing::debug!(buckets = self.table.len(), "created bucket");
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chains;
    use std::collections::hash_map::RandomState;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl core::hash::Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    /// Invariant: a bucket is created once per key; later calls return it.
    #[test]
    fn get_or_create_is_stable() {
        let mut chains: Chains<String, i32> = Chains::with_capacity(0);
        let mut idx: BucketIndex<String, RandomState> =
            BucketIndex::with_capacity_and_hasher(0, RandomState::new());
        let mut created = 0;
        let h1 = idx.get_or_create(&"a".to_string(), || {
            created += 1;
            chains.new_head()
        });
        let h2 = idx.get_or_create(&"a".to_string(), || {
            created += 1;
            chains.new_head()
        });
        assert_eq!(h1, h2);
        assert_eq!(created, 1);
        assert_eq!(idx.len(), 1);
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn lookup_with_borrowed_key() {
        let mut chains: Chains<String, i32> = Chains::with_capacity(0);
        let mut idx: BucketIndex<String, RandomState> =
            BucketIndex::with_capacity_and_hasher(0, RandomState::new());
        let h = idx.get_or_create(&"hello".to_string(), || chains.new_head());
        assert_eq!(idx.lookup("hello"), Some(h));
        assert_eq!(idx.lookup("world"), None);
    }

    /// Invariant: colliding hashes still resolve to separate buckets by `Eq`.
    #[test]
    fn colliding_keys_get_distinct_buckets() {
        let mut chains: Chains<u32, i32> = Chains::with_capacity(0);
        let mut idx: BucketIndex<u32, ConstBuildHasher> =
            BucketIndex::with_capacity_and_hasher(0, ConstBuildHasher);
        let a = idx.get_or_create(&1, || chains.new_head());
        let b = idx.get_or_create(&2, || chains.new_head());
        assert_ne!(a, b);
        assert_eq!(idx.lookup(&1), Some(a));
        assert_eq!(idx.lookup(&2), Some(b));
        assert_eq!(idx.lookup(&3), None);
    }
}
