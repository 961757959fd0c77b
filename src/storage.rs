//! Storage facade: the capability traits containers are written against.
//!
//! `Checkable` covers the read-only queries and `Storable` the ownership
//! transfers. `Storage` is both, blanket-implemented. The traits are object
//! safe, so a container can hold a `Box<dyn Storage<K, V> + Send + Sync>` as
//! readily as a concrete [`SharedMultiMap`].

use crate::error::ExtractError;
use crate::shared::SharedMultiMap;
use core::hash::{BuildHasher, Hash};

pub trait Checkable<K, V> {
    /// True if some value stored under `key` satisfies `pred`.
    fn contains_where(&self, key: &K, pred: &mut dyn FnMut(&V) -> bool) -> bool;

    fn contains(&self, key: &K) -> bool {
        self.contains_where(key, &mut |_| true)
    }

    /// Number of stored values.
    fn count(&self) -> usize;
}

pub trait Storable<K, V> {
    /// Take ownership of `value` and index it under `key`.
    fn insert(&self, key: K, value: V);

    /// Hand back the first value under `key` that satisfies `pred`.
    fn extract_where(
        &self,
        key: &K,
        pred: &mut dyn FnMut(&V) -> bool,
    ) -> Result<V, ExtractError>;

    fn extract(&self, key: &K) -> Result<V, ExtractError> {
        self.extract_where(key, &mut |_| true)
    }
}

pub trait Storage<K, V>: Checkable<K, V> + Storable<K, V> {}

impl<K, V, T> Storage<K, V> for T where T: ?Sized + Checkable<K, V> + Storable<K, V> {}

impl<K, V, S> Checkable<K, V> for SharedMultiMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn contains_where(&self, key: &K, pred: &mut dyn FnMut(&V) -> bool) -> bool {
        SharedMultiMap::contains_where(self, key, pred)
    }

    fn contains(&self, key: &K) -> bool {
        SharedMultiMap::contains(self, key)
    }

    fn count(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> Storable<K, V> for SharedMultiMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn insert(&self, key: K, value: V) {
        SharedMultiMap::insert(self, key, value)
    }

    fn extract_where(
        &self,
        key: &K,
        pred: &mut dyn FnMut(&V) -> bool,
    ) -> Result<V, ExtractError> {
        SharedMultiMap::extract_where(self, key, pred)
    }

    fn extract(&self, key: &K) -> Result<V, ExtractError> {
        SharedMultiMap::extract(self, key)
    }
}
