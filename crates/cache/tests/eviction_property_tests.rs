//! Property-based tests for eviction strategies
//!
//! Every built-in strategy is driven through arbitrary interleavings of adds,
//! touches and removals, and checked against a plain key-set model.

use memtide_cache::{EvictionStrategy, EvictionStrategyFactory, BUILTIN_STRATEGIES, RANDOM};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Access(u8),
    Remove(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    // A small key space keeps re-adds, touches and ghost hits frequent
    prop_oneof![
        3 => (0u8..12).prop_map(Op::Add),
        2 => (0u8..12).prop_map(Op::Access),
        1 => (0u8..12).prop_map(Op::Remove),
    ]
}

fn key(id: u8) -> String {
    format!("key-{id}")
}

fn factory() -> EvictionStrategyFactory {
    // Small ARC capacity so ghost lists and adaptation are exercised
    EvictionStrategyFactory::with_arc_capacity(4)
}

fn apply(strategy: &dyn EvictionStrategy, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Add(id) => strategy.record_add(&key(*id), None),
            Op::Access(id) => strategy.record_access(&key(*id)),
            Op::Remove(id) => strategy.record_remove(&key(*id)),
        }
    }
}

fn model(ops: &[Op]) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for op in ops {
        match op {
            Op::Add(id) => {
                keys.insert(key(*id));
            }
            Op::Remove(id) => {
                keys.remove(&key(*id));
            }
            Op::Access(_) => {}
        }
    }
    keys
}

proptest! {
    /// Tracked keys are exactly the added keys minus the removed ones
    #[test]
    fn prop_metadata_matches_key_set(ops in prop::collection::vec(arb_op(), 0..200)) {
        let factory = factory();
        let expected = model(&ops);

        for name in BUILTIN_STRATEGIES {
            let strategy = factory.create(name).unwrap();
            apply(strategy.as_ref(), &ops);

            let tracked: BTreeSet<String> =
                strategy.metadata().into_iter().map(|entry| entry.key).collect();

            prop_assert_eq!(&tracked, &expected, "strategy {}", name);
            prop_assert_eq!(strategy.len(), expected.len());
            prop_assert_eq!(strategy.stats().total_items, expected.len());
            for id in 0u8..12 {
                prop_assert_eq!(strategy.contains(&key(id)), expected.contains(&key(id)));
            }
        }
    }

    /// Batch candidates are distinct, tracked and as many as possible
    #[test]
    fn prop_eviction_keys_are_distinct_tracked_keys(
        ops in prop::collection::vec(arb_op(), 0..200),
        count in 0usize..16,
    ) {
        let factory = factory();
        let expected = model(&ops);

        for name in BUILTIN_STRATEGIES {
            let strategy = factory.create(name).unwrap();
            apply(strategy.as_ref(), &ops);

            let picks = strategy.eviction_keys(count);
            let distinct: BTreeSet<&String> = picks.iter().collect();

            prop_assert_eq!(picks.len(), count.min(expected.len()), "strategy {}", name);
            prop_assert_eq!(distinct.len(), picks.len());
            prop_assert!(picks.iter().all(|pick| expected.contains(pick)));

            // Asking does not change what is tracked
            prop_assert_eq!(strategy.len(), expected.len());
        }
    }

    /// A batch equals repeated single picks followed by removal
    #[test]
    fn prop_batch_matches_sequential_eviction(
        ops in prop::collection::vec(arb_op(), 0..200),
        count in 1usize..16,
    ) {
        let factory = factory();

        for name in BUILTIN_STRATEGIES.iter().filter(|name| **name != RANDOM) {
            let batched = factory.create(name).unwrap();
            let sequential = factory.create(name).unwrap();
            apply(batched.as_ref(), &ops);
            apply(sequential.as_ref(), &ops);

            let batch = batched.eviction_keys(count);

            let mut one_by_one = Vec::new();
            while one_by_one.len() < count {
                let Some(pick) = sequential.eviction_key() else {
                    break;
                };
                sequential.record_remove(&pick);
                one_by_one.push(pick);
            }

            prop_assert_eq!(batch, one_by_one, "strategy {}", name);
        }
    }

    /// Clearing forgets everything, and the strategy keeps working afterwards
    #[test]
    fn prop_clear_resets_tracking(ops in prop::collection::vec(arb_op(), 0..100)) {
        let factory = factory();

        for name in BUILTIN_STRATEGIES {
            let strategy = factory.create(name).unwrap();
            apply(strategy.as_ref(), &ops);
            strategy.clear();

            prop_assert!(strategy.is_empty());
            prop_assert_eq!(strategy.eviction_key(), None);

            strategy.record_add("fresh", None);
            prop_assert_eq!(strategy.eviction_key(), Some("fresh".to_string()));
        }
    }
}
