//! SharedMultiMap: the engine behind one reader/writer lock.
//!
//! `insert` and `extract*` take the lock exclusively; `contains*` and the
//! counters share it, so read-only queries from many threads proceed in
//! parallel and only serialize against mutations. Every operation runs to
//! completion while holding the lock; predicates run under the lock and must
//! not call back into the same map.

use crate::error::ExtractError;
use crate::multi_map::MultiMap;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use parking_lot::RwLock;
use std::collections::hash_map::RandomState;

/// [`MultiMap`] shared between threads through `&self`. `Send + Sync` when
/// `K`, `V` and `S` are.
pub struct SharedMultiMap<K, V, S = RandomState> {
    inner: RwLock<MultiMap<K, V, S>>,
    reentrancy: DebugReentrancy,
}

impl<K, V> SharedMultiMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with the default hasher.
    pub fn new() -> Self {
        Self::from(MultiMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(MultiMap::with_capacity(capacity))
    }
}

impl<K, V> Default for SharedMultiMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> From<MultiMap<K, V, S>> for SharedMultiMap<K, V, S> {
    fn from(map: MultiMap<K, V, S>) -> Self {
        Self {
            inner: RwLock::new(map),
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> SharedMultiMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from(MultiMap::with_hasher(hasher))
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::from(MultiMap::with_capacity_and_hasher(capacity, hasher))
    }

    pub fn len(&self) -> usize {
        let _g = self.reentrancy.enter();
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        let _g = self.reentrancy.enter();
        self.inner.read().is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        let _g = self.reentrancy.enter();
        self.inner.read().bucket_count()
    }

    pub fn insert(&self, key: K, value: V)
    where
        K: Clone,
    {
        let _g = self.reentrancy.enter();
        let mut map = self.inner.write();
        map.insert(key, value);
        tracing::trace!(count = map.len(), "inserted value");
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.inner.read().contains(q)
    }

    pub fn contains_where<Q, F>(&self, q: &Q, pred: F) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnMut(&V) -> bool,
    {
        let _g = self.reentrancy.enter();
        self.inner.read().contains_where(q, pred)
    }

    pub fn count_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.inner.read().count_of(q)
    }

    pub fn extract<Q>(&self, q: &Q) -> Result<V, ExtractError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.extract_where(q, |_| true)
    }

    pub fn extract_where<Q, F>(&self, q: &Q, pred: F) -> Result<V, ExtractError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnMut(&V) -> bool,
    {
        let _g = self.reentrancy.enter();
        let mut map = self.inner.write();
        let value = map.extract_where(q, pred)?;
        tracing::trace!(count = map.len(), "extracted value");
        Ok(value)
    }

    /// Unwrap the engine. No lock is needed: `self` is owned.
    pub fn into_inner(self) -> MultiMap<K, V, S> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use std::sync::Barrier;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shared_map_is_send_and_sync() {
        assert_send_sync::<SharedMultiMap<i32, Item>>();
    }

    #[test]
    fn operations_through_shared_reference() {
        let m: SharedMultiMap<i32, Item> = SharedMultiMap::new();
        m.insert(5, Item::new(5, 1.0));
        m.insert(5, Item::new(5, 10.0));
        assert_eq!(m.len(), 2);
        assert_eq!(m.count_of(&5), 2);
        assert!(m.contains_where(&5, |i| i.weight() == 1.0));

        assert_eq!(m.extract(&5).unwrap().weight(), 10.0);
        assert_eq!(m.extract(&5).unwrap().weight(), 1.0);
        assert_eq!(m.extract(&5), Err(ExtractError::NotFound));
        assert!(m.is_empty());
        assert_eq!(m.bucket_count(), 1);
    }

    #[test]
    fn round_trip_through_engine() {
        let mut engine: MultiMap<&'static str, i32> = MultiMap::new();
        engine.insert("a", 1);
        let shared = SharedMultiMap::from(engine);
        shared.insert("a", 2);
        let mut engine = shared.into_inner();
        assert_eq!(engine.extract("a"), Ok(2));
        assert_eq!(engine.extract("a"), Ok(1));
    }

    /// Invariant: readers share the lock. Two threads both sit inside a
    /// `contains_where` predicate at the same time; with an exclusive lock the
    /// barrier would never release.
    #[test]
    fn readers_run_concurrently() {
        let m: SharedMultiMap<i32, i32> = SharedMultiMap::new();
        m.insert(1, 1);
        let barrier = Barrier::new(2);
        std::thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    assert!(m.contains_where(&1, |_| {
                        barrier.wait();
                        true
                    }));
                });
            }
        });
    }

    /// Invariant (debug-only): a predicate calling back into the same map
    /// panics instead of deadlocking.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrant_predicate_panics() {
        let m: SharedMultiMap<i32, i32> = SharedMultiMap::new();
        m.insert(1, 1);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.extract_where(&1, |_| m.contains(&1));
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");

        // The lock was released during unwinding.
        assert_eq!(m.len(), 1);
        assert_eq!(m.extract(&1), Ok(1));
    }
}
