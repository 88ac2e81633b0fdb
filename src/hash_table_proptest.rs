#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// chain invariants after every operation.

use crate::hash_table::{EntryHandle, HashTable};
use crate::ownership::Ownership;
use crate::strategy::{FnKeys, KeyStrategy, StrKeys};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Mutate(usize, i32),
    Walk,
    Clean,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            3 => idx.clone().prop_map(Op::Get),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Walk),
            1 => Just(Op::Clean),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drive the table and a std HashMap model through the same operations.
// Checked after every step:
// - chain invariants (count, bucket placement, prev/next agreement);
// - `len` parity with the model and `get` parity for every pool key;
// - the key destructor has run once per displaced key;
// - capacity only changes by doubling.
fn run_scenario<S>(strategy: S, initial: usize, pool: &[String], ops: Vec<Op>) -> Result<(), TestCaseError>
where
    S: KeyStrategy<String>,
{
    let destroyed = Arc::new(AtomicUsize::new(0));
    let d = destroyed.clone();
    let mut sut: HashTable<String, i32, S> = HashTable::with_ownership(
        initial,
        strategy,
        Ownership::owned(move |_k: String| {
            d.fetch_add(1, Ordering::Relaxed);
        }),
        Ownership::Borrowed,
    )
    .expect("positive capacity");
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut expected_destroyed = 0usize;

    for op in ops {
        let cap_before = sut.capacity();
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let displaced = sut.put(k.clone(), v).expect("put succeeds");
                // Key owned: never handed back. Value borrowed: old value returned.
                prop_assert!(displaced.key.is_none());
                match model.insert(k, v) {
                    Some(old) => {
                        expected_destroyed += 1;
                        prop_assert_eq!(displaced.value, Some(old));
                    }
                    None => prop_assert!(displaced.value.is_none()),
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let res = sut.remove(k);
                match model.remove(k) {
                    Some(old) => {
                        expected_destroyed += 1;
                        let displaced = res.expect("present key removes");
                        prop_assert_eq!(displaced.value, Some(old));
                    }
                    None => prop_assert!(res.is_none()),
                }
                prop_assert!(sut.get(k).is_none());
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                if let Some(e) = sut.get_entry(k) {
                    prop_assert_eq!(e.hash(), sut.strategy().hash(k));
                    prop_assert_eq!(e.key(), k);
                }
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Walk => {
                let mut seen: HashSet<EntryHandle> = HashSet::new();
                let mut walked: BTreeMap<String, i32> = BTreeMap::new();
                let mut cur = sut.begin();
                while let Some(h) = cur {
                    prop_assert!(seen.insert(h), "entry visited twice");
                    let e = sut.entry(h).expect("walk yields live handles");
                    walked.insert(e.key().clone(), *e.value());
                    cur = sut.next(h);
                }
                let expected: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(walked, expected);
                prop_assert_eq!(sut.iter().len(), sut.len());
            }
            Op::Clean => {
                expected_destroyed += model.len();
                model.clear();
                sut.clean();
                prop_assert_eq!(sut.capacity(), cap_before);
            }
        }

        sut.check_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(destroyed.load(Ordering::Relaxed), expected_destroyed);
        let cap = sut.capacity();
        prop_assert!(cap == cap_before || cap == cap_before * 2);
        for k in pool {
            prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
        }
    }

    let remaining = sut.len();
    drop(sut);
    prop_assert_eq!(destroyed.load(Ordering::Relaxed), expected_destroyed + remaining);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), initial in 1usize..=4) {
        run_scenario(StrKeys, initial, &pool, ops)?;
    }
}

// Same invariants under worst-case collisions: every key lands in one chain,
// so removal exercises head, middle and tail unlinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(), initial in 1usize..=4) {
        let colliding = FnKeys::new(|_: &String| 7u32, |a: &String, b: &String| a == b);
        run_scenario(colliding, initial, &pool, ops)?;
    }
}
