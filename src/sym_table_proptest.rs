#![cfg(test)]

// Property tests for SymTable kept inside the crate so they can check the
// structural invariants through `assert_invariants`.

use crate::hash::hash_key;
use crate::sym_table::{Growth, InsertError, SymTable};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Replace(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Visit,
}

fn arb_ops(pool_len: usize) -> impl Strategy<Value = Vec<OpI>> {
    let idx = 0..pool_len;
    let op = prop_oneof![
        (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
        (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
        idx.clone().prop_map(OpI::Remove),
        idx.clone().prop_map(OpI::Get),
        "[a-z]{0,5}".prop_map(OpI::Contains),
        (idx, any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
        Just(OpI::Visit),
    ];
    proptest::collection::vec(op, 1..80)
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let n = pool.len();
        arb_ops(n).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Pool of keys that all share one bucket in a 509-bucket table.
fn colliding_pool() -> Vec<String> {
    let target = hash_key("c0", 509);
    (0..)
        .map(|i| format!("c{i}"))
        .filter(|k| hash_key(k, 509) == target)
        .take(8)
        .collect()
}

fn run_against_model(
    sut: &mut SymTable<i32>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = &pool[i];
                let already = model.contains_key(k);
                match sut.put(k, v) {
                    Ok(()) => {
                        prop_assert!(!already, "put must fail on duplicate");
                        model.insert(k.clone(), v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {e}"),
                }
            }
            OpI::Replace(i, v) => {
                let k = &pool[i];
                let old = sut.replace(k, v);
                let expected = model.get_mut(k).map(|mv| std::mem::replace(mv, v));
                prop_assert_eq!(old, expected);
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(!sut.contains(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains(k), model.contains_key(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(k).expect("present in model");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            OpI::Visit => {
                let mut seen: BTreeMap<String, i32> = BTreeMap::new();
                let mut visits = 0usize;
                sut.for_each_with(&mut visits, |k, v, n| {
                    *n += 1;
                    seen.insert(k.to_string(), *v);
                });
                let expected: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(visits, model.len(), "each binding visited once");
                prop_assert_eq!(seen, expected);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected and leave the bound value in place.
// - `replace`/`remove` hand back exactly the model's previous value.
// - `get`/`contains` parity for pooled and arbitrary keys.
// - Traversal visits each live binding exactly once.
// - Chains stay well formed and `len` matches the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut = SymTable::new();
        run_against_model(&mut sut, &pool, ops)?;
    }
}

// Property: Same state-machine invariants with every key in one chain, so
// removal exercises head, middle and tail unlinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_single_chain(ops in arb_ops(8)) {
        let pool = colliding_pool();
        let mut sut = SymTable::with_growth(Growth::Fixed);
        run_against_model(&mut sut, &pool, ops)?;
    }
}

// Property: Growing tables keep every binding reachable across rehashes, in
// either removal order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 16, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_keeps_bindings(n in 400usize..2_500, reverse in any::<bool>()) {
        let mut sut = SymTable::new();
        for i in 0..n {
            let bound = sut.put(&format!("g{i}"), i).is_ok();
            prop_assert!(bound);
        }
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), n);
        prop_assert!(sut.load_factor() <= 1.0);

        let mut order: Vec<usize> = (0..n).collect();
        if reverse {
            order.reverse();
        }
        for i in order {
            let key = format!("g{i}");
            prop_assert_eq!(sut.remove(&key), Some(i));
        }
        prop_assert!(sut.is_empty());
        sut.assert_invariants();
    }
}
