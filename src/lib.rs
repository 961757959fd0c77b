//! multimap-store: a thread-safe multi-map with non-unique keys, where
//! lookups and extractions can be narrowed by a predicate over the stored
//! value.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a container that holds many values per key, hands each value
//!   back exactly once, and can be shared between worker threads.
//! - Layers:
//!   - Chains: per-key singly linked chains in a generational arena
//!     (`slotmap`). Each chain starts at a payload-less head node.
//!   - BucketIndex: `hashbrown::HashTable` from key to head node.
//!   - MultiMap<K, V, S>: single-threaded engine; insert / contains /
//!     extract over one bucket's chain.
//!   - SharedMultiMap<K, V, S>: the engine behind a `parking_lot::RwLock`.
//!   - Storage traits (`Checkable`, `Storable`, `Storage`): the narrow
//!     facade containers are written against.
//!   - WeightBox: a weight-bounded container of `Item`s over any `Storage`.
//!
//! Constraints
//! - Values are moved in and out; no `Clone` bound on `V`.
//! - Insertion is O(1) average: the new node goes directly after the head,
//!   so no traversal is needed.
//! - Extraction walks one chain head-first and takes the first node whose
//!   key equals the query and whose value satisfies the predicate. With
//!   duplicate keys and no narrowing predicate this is last-in, first-out.
//! - Head nodes are never removed. A key whose values were all extracted
//!   keeps its index entry, so re-inserting it does not touch the index.
//! - Stored count is derived as `arena nodes - buckets`, never tracked
//!   separately.
//!
//! Concurrency
//! - `insert` / `extract*` take the write lock; `contains*` and counters
//!   take the read lock and run in parallel with each other.
//! - Predicates run while the lock is held and must not call back into the
//!   same map or `WeightBox`. Debug builds detect this per thread and panic
//!   instead of deadlocking (see `reentrancy`).
//!
//! Hasher invariants
//! - Each index entry stores its precomputed `u64` hash; growing the index
//!   never calls `K: Hash` again.
//!
//! Non-goals
//! - No iteration over all entries, no range queries, no removal of a whole
//!   bucket, no ordering beyond per-key recency.

mod bucket_index;
mod chain;
pub mod error;
pub mod item;
pub mod multi_map;
mod multi_map_proptest;
mod reentrancy;
pub mod shared;
pub mod storage;
pub mod weight_box;

// Public surface
pub use error::{BoxError, ExtractError};
pub use item::{Item, ItemId};
pub use multi_map::MultiMap;
pub use shared::SharedMultiMap;
pub use storage::{Checkable, Storable, Storage};
pub use weight_box::{BoxConfig, WeightBox, WeightLimit};
