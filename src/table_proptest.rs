#![cfg(test)]

// Property tests for StrTable kept inside the crate, next to the table
// and hash functions they cross-check.

use crate::hash::{mix32, reduce};
use crate::table::{StrTable, INITIAL_CAPACITY};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Get(usize),
    Lookup(String),
    Probe(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z ]{0,8}", 1..=160).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            1 => "[a-z ]{0,8}".prop_map(OpI::Lookup),
            1 => (0usize..1024).prop_map(OpI::Probe),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..400).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn expected_collisions(model: &HashMap<String, i32>, capacity: usize) -> u32 {
    let mut per_home: HashMap<u32, u32> = HashMap::new();
    for k in model.keys() {
        *per_home
            .entry(reduce(mix32(k.as_bytes()), capacity as u32))
            .or_default() += 1;
    }
    per_home.values().map(|&c| c - 1).sum()
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `set` returns the previous value exactly when the model has the key.
// - `get` agrees with the model for pooled and arbitrary keys.
// - `probe` only ever exposes entries the model holds.
// - Capacity is a power of two, starts at 128 and doubles exactly when
//   `set` is called at a load factor of at least one half, update or not.
// - `len` parity with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut = StrTable::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            let cap_before = sut.capacity();
            let len_before = sut.len();
            match op {
                OpI::Set(i, v) => {
                    let k = &pool[i];
                    let prev = sut.set(k, v).expect("allocation");
                    prop_assert_eq!(prev, model.insert(k.clone(), v));
                    let grows = len_before * 2 >= cap_before;
                    let expected_cap = if grows { cap_before * 2 } else { cap_before };
                    prop_assert_eq!(sut.capacity(), expected_cap);
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k).copied());
                }
                OpI::Lookup(s) => {
                    prop_assert_eq!(sut.get(&s), model.get(&s).copied());
                    prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
                }
                OpI::Probe(idx) => {
                    if let Some((k, v)) = sut.probe(idx) {
                        prop_assert!(idx < sut.capacity());
                        prop_assert_eq!(model.get(k), Some(&v));
                    }
                }
                OpI::Iterate => {
                    let s: BTreeMap<String, i32> =
                        sut.iter().map(|(k, v)| (k.to_string(), v)).collect();
                    let m: BTreeMap<String, i32> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(s, m);
                    let occupied = (0..sut.capacity())
                        .filter(|&i| sut.probe(i).is_some())
                        .count();
                    prop_assert_eq!(occupied, model.len());
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.capacity().is_power_of_two());
            prop_assert!(sut.capacity() >= INITIAL_CAPACITY);
            prop_assert!(sut.len() * 2 <= sut.capacity());
        }

        prop_assert_eq!(sut.collisions(), expected_collisions(&model, sut.capacity()));
    }
}

// Property: every key survives any number of growth steps with its last
// value, and the growth observer fires once per doubling.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_no_loss_across_growth(
        keys in proptest::collection::btree_set("[a-zA-Z]{1,6} [a-zA-Z]{1,6}", 1..600)
    ) {
        use std::cell::Cell;
        use std::rc::Rc;

        let growths = Rc::new(Cell::new(0usize));
        let seen = Rc::clone(&growths);
        let mut sut = StrTable::new().with_observer(move |e: &crate::GrowthEvent| {
            assert_eq!(e.new_capacity, e.old_capacity * 2);
            seen.set(seen.get() + 1);
        });

        let keys: Vec<String> = keys.into_iter().collect();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.set(k, i as i32).expect("allocation"), None);
        }
        // Second pass overwrites; it grows once only if the first pass
        // stopped at exactly half load.
        let before = sut.capacity();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.set(k, -(i as i32)).expect("allocation"), Some(i as i32));
        }
        let expected = if keys.len() * 2 >= before { before * 2 } else { before };
        let cap = sut.capacity();
        prop_assert_eq!(cap, expected);
        prop_assert_eq!(sut.len(), keys.len());

        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.get(k), Some(-(i as i32)));
        }
        let listed: BTreeSet<&str> = sut.iter().map(|(k, _)| k).collect();
        prop_assert_eq!(listed.len(), keys.len());

        let doublings = (cap / INITIAL_CAPACITY).trailing_zeros() as usize;
        prop_assert_eq!(growths.get(), doublings);
    }
}
