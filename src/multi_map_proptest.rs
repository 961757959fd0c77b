#![cfg(test)]

// Property tests for MultiMap kept inside the crate so they can drive the
// engine alongside its internal invariants.

use crate::error::ExtractError;
use crate::multi_map::MultiMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Extract(usize),
    // Extract the newest value with `v mod 3 == r`.
    ExtractWhere(usize, i32),
    Contains(String),
    ContainsWhere(usize, i32),
    CountOf(usize),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn residue_is(r: i32) -> impl Fn(&i32) -> bool {
    move |v: &i32| v.rem_euclid(3) == r
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Extract),
            2 => (idx.clone(), 0i32..3).prop_map(|(i, r)| OpI::ExtractWhere(i, r)),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), 0i32..3).prop_map(|(i, r)| OpI::ContainsWhere(i, r)),
            1 => idx.clone().prop_map(OpI::CountOf),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against a HashMap<Key, Vec<i32>> model whose
// vectors hold each key's values oldest first. Invariants exercised:
// - extraction returns the newest matching value, or NotFound when the model
//   has none; a failed extraction changes nothing;
// - contains / contains_where / count_of parity with the model;
// - len equals the total number of stored values;
// - bucket_count equals the number of distinct keys ever inserted (emptied
//   buckets are kept).
fn run_state_machine<S: BuildHasher>(
    mut sut: MultiMap<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, Vec<i32>> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                sut.insert(k.clone(), v);
                model.entry(k).or_default().push(v);
            }
            OpI::Extract(i) => {
                let k = key_from(&pool, i);
                let expected = model.get_mut(&k).and_then(|vs| vs.pop());
                prop_assert_eq!(sut.extract(&k), expected.ok_or(ExtractError::NotFound));
            }
            OpI::ExtractWhere(i, r) => {
                let k = key_from(&pool, i);
                let pred = residue_is(r);
                let expected = model.get_mut(&k).and_then(|vs| {
                    let pos = vs.iter().rposition(|v| pred(v))?;
                    Some(vs.remove(pos))
                });
                prop_assert_eq!(
                    sut.extract_where(&k, residue_is(r)),
                    expected.ok_or(ExtractError::NotFound)
                );
            }
            OpI::Contains(s) => {
                let has_model = model.iter().any(|(k, vs)| k.0 == s && !vs.is_empty());
                prop_assert_eq!(sut.contains(s.as_str()), has_model);
            }
            OpI::ContainsWhere(i, r) => {
                let k = key_from(&pool, i);
                let pred = residue_is(r);
                let has_model = model
                    .get(&k)
                    .map(|vs| vs.iter().any(|v| pred(v)))
                    .unwrap_or(false);
                prop_assert_eq!(sut.contains_where(&k, residue_is(r)), has_model);
            }
            OpI::CountOf(i) => {
                let k = key_from(&pool, i);
                let n = model.get(&k).map(Vec::len).unwrap_or(0);
                prop_assert_eq!(sut.count_of(&k), n);
            }
        }

        // Post-conditions after each op
        let total: usize = model.values().map(Vec::len).sum();
        prop_assert_eq!(sut.len(), total);
        prop_assert_eq!(sut.is_empty(), total == 0);
        prop_assert_eq!(sut.bucket_count(), model.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(MultiMap::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same state-machine invariants as above, with every key hashing
// to the same value.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(MultiMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Property: draining every key n times in LIFO order returns exactly the
// inserted values, newest first, and leaves an empty map.
proptest! {
    #[test]
    fn prop_drain_is_lifo(values in proptest::collection::vec((0u8..6, any::<i32>()), 0..200)) {
        let mut sut: MultiMap<u8, i32> = MultiMap::new();
        let mut model: HashMap<u8, Vec<i32>> = HashMap::new();
        for (k, v) in &values {
            sut.insert(*k, *v);
            model.entry(*k).or_default().push(*v);
        }
        prop_assert_eq!(sut.len(), values.len());

        for (k, mut vs) in model {
            while let Some(v) = vs.pop() {
                prop_assert_eq!(sut.extract(&k), Ok(v));
            }
            prop_assert_eq!(sut.extract(&k), Err(ExtractError::NotFound));
        }
        prop_assert!(sut.is_empty());
    }
}
