#![cfg(test)]

// Property tests for Table kept inside the crate so they can check the
// internal load limit and drive tables with deliberately weak hash pairs.

use crate::config::{CollisionStrategy, TableConfig};
use crate::double_hash::load_limit;
use crate::error::TableError;
use crate::hash_pair::HashPair;
use crate::key_codec::KeyKind;
use crate::prime::is_prime;
use crate::table::{Insertion, Table};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

static VALUES: [i32; 8] = [0, 1, -1, 7, 42, 1000, i32::MIN, i32::MAX];

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, Option<usize>),
    Lookup(usize),
    Contains(Vec<u8>),
    Iterate,
}

fn text_key() -> impl Strategy<Value = Vec<u8>> + Clone {
    "[a-z]{0,5}".prop_map(String::into_bytes)
}

fn u32_key() -> impl Strategy<Value = Vec<u8>> + Clone {
    any::<u32>().prop_map(|n| n.to_ne_bytes().to_vec())
}

// Random 8-byte integers mixed with small sequential ones, whose high
// bytes are all zero.
fn u64_key() -> impl Strategy<Value = Vec<u8>> + Clone {
    prop_oneof![any::<u64>(), 0u64..100_000].prop_map(|n| n.to_le_bytes().to_vec())
}

fn arb_scenario(
    key: impl Strategy<Value = Vec<u8>> + Clone,
) -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<OpI>)> {
    proptest::collection::vec(key.clone(), 1..=40).prop_flat_map(move |pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            3 => (idx.clone(), proptest::option::of(0..VALUES.len()))
                .prop_map(|(i, v)| OpI::Insert(i, v)),
            1 => idx.clone().prop_map(OpI::Lookup),
            1 => key.clone().prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Hash functions that collide constantly: keys of equal length share a
// primary slot, keys with the same first byte share a secondary one.
fn by_len(key: &[u8]) -> u64 {
    key.len() as u64
}

fn by_first_byte(key: &[u8]) -> u64 {
    key.first().map_or(0, |&b| u64::from(b))
}

// State-machine equivalence against a HashMap model. When
// `rehash_may_fail` is set, a RehashFailure is accepted but must leave the
// table exactly as it was.
fn check_against_model<'a>(
    sut: &mut Table<'a, i32>,
    pool: &'a [Vec<u8>],
    ops: Vec<OpI>,
    rehash_may_fail: bool,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<&'a [u8], Option<i32>> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let key = pool[i].as_slice();
                let value = v.map(|j| &VALUES[j]);
                let already = model.contains_key(key);
                let (len, capacity) = (sut.len(), sut.capacity());
                match sut.insert(key, value) {
                    Ok(Insertion::Added) => {
                        prop_assert!(!already, "added a key that was already stored");
                        model.insert(key, value.copied());
                    }
                    Ok(Insertion::AlreadyPresent) => {
                        prop_assert!(already, "duplicate reported for a new key");
                    }
                    Err(TableError::RehashFailure { .. }) if rehash_may_fail => {
                        prop_assert!(!already);
                        prop_assert_eq!(sut.len(), len);
                        prop_assert_eq!(sut.capacity(), capacity);
                        prop_assert!(!sut.contains_key(key).unwrap());
                    }
                    Err(e) => prop_assert!(false, "insert failed: {}", e),
                }
            }
            OpI::Lookup(i) => {
                let key = pool[i].as_slice();
                let expected = model.get(key).copied().flatten();
                prop_assert_eq!(sut.lookup(key).unwrap().copied(), expected);
                prop_assert_eq!(sut.contains_key(key).unwrap(), model.contains_key(key));
            }
            OpI::Contains(q) => {
                prop_assert_eq!(
                    sut.contains_key(&q).unwrap(),
                    model.contains_key(q.as_slice())
                );
            }
            OpI::Iterate => {
                let s_keys: Vec<&[u8]> = sut.iter().map(|e| e.key).collect();
                let unique: BTreeSet<&[u8]> = s_keys.iter().copied().collect();
                prop_assert_eq!(unique.len(), s_keys.len(), "a key is stored twice");
                let m_keys: BTreeSet<&[u8]> = model.keys().copied().collect();
                prop_assert_eq!(unique, m_keys);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(is_prime(sut.capacity()), "capacity {} is not prime", sut.capacity());
        match sut.strategy() {
            CollisionStrategy::Cuckoo => prop_assert!(sut.len() <= sut.capacity()),
            CollisionStrategy::DoubleHashing => {
                prop_assert!(sut.len() <= load_limit(sut.capacity()))
            }
        }
    }

    for (key, value) in &model {
        prop_assert_eq!(sut.lookup(key).unwrap().copied(), *value);
    }
    Ok(())
}

const STRATEGIES: [CollisionStrategy; 2] =
    [CollisionStrategy::Cuckoo, CollisionStrategy::DoubleHashing];

// Property: text tables under the default hash pair agree with the model
// for both strategies, across growth.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_text_keys_match_model((pool, ops) in arb_scenario(text_key())) {
        for strategy in STRATEGIES {
            let config = TableConfig::new(KeyKind::Text).with_strategy(strategy);
            let mut sut: Table<'_, i32> = Table::with_config(config).unwrap();
            check_against_model(&mut sut, &pool, ops.clone(), false)?;
        }
    }
}

// Property: 4-byte binary keys, including embedded zero bytes, behave the
// same way under the integer mix.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_fixed_width_keys_match_model((pool, ops) in arb_scenario(u32_key())) {
        for strategy in STRATEGIES {
            let config = TableConfig::new(KeyKind::from_width(4)).with_strategy(strategy);
            let mut sut: Table<'_, i32> = Table::with_config(config).unwrap();
            check_against_model(&mut sut, &pool, ops.clone(), false)?;
        }
    }
}

// Property: 8-byte keys, hashed with the seeded pair, match the model too.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_eight_byte_keys_match_model((pool, ops) in arb_scenario(u64_key())) {
        for strategy in STRATEGIES {
            let config = TableConfig::new(KeyKind::from_width(8)).with_strategy(strategy);
            let mut sut: Table<'_, i32> = Table::with_config(config).unwrap();
            check_against_model(&mut sut, &pool, ops.clone(), false)?;
        }
    }
}

// Property: under a hash pair that collides constantly, double hashing still
// stores everything; cuckoo may refuse an insert but never loses or
// corrupts what it already holds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(text_key())) {
        let hashes = HashPair::new(by_len, by_first_byte);
        for strategy in STRATEGIES {
            let config = TableConfig::new(KeyKind::Text)
                .with_strategy(strategy)
                .with_max_resize_attempts(2);
            let mut sut: Table<'_, i32> = Table::with_hashes(config, hashes).unwrap();
            let rehash_may_fail = strategy == CollisionStrategy::Cuckoo;
            check_against_model(&mut sut, &pool, ops.clone(), rehash_may_fail)?;
        }
    }
}
