//! Property-based tests for memory accounting

use memtide_cache::{MemoryConfig, MemoryManager, MemoryPressure, PressureThresholds};
use proptest::prelude::*;
use std::time::Duration;

fn manager(max_memory: u64, auto_response: bool) -> MemoryManager {
    let config = MemoryConfig::builder()
        .with_max_memory(max_memory)
        .with_auto_cleanup_interval(Duration::ZERO)
        .with_auto_pressure_response(auto_response)
        .build()
        .unwrap();
    MemoryManager::new(config).unwrap()
}

proptest! {
    /// Usage is the running sum of deltas, clamped at zero after every step
    #[test]
    fn prop_usage_is_clamped_running_sum(
        deltas in prop::collection::vec(-5_000i64..5_000, 0..100),
        auto_response in any::<bool>(),
    ) {
        let manager = manager(100_000, auto_response);
        let mut expected: u64 = 0;

        for delta in deltas {
            manager.update_usage(delta, Some("memory"));
            expected = if delta >= 0 {
                expected + delta as u64
            } else {
                expected.saturating_sub(delta.unsigned_abs())
            };

            let stats = manager.stats();
            prop_assert_eq!(stats.total_used, expected);
            prop_assert_eq!(stats.engine_usage["memory"], expected);
        }
    }

    /// The reported level always matches the usage ratio
    #[test]
    fn prop_pressure_level_follows_usage(
        max_memory in 1u64..1_000_000,
        used in 0u64..2_000_000,
    ) {
        let manager = manager(max_memory, false);
        manager.update_usage(used as i64, None);

        let stats = manager.stats();
        let expected = PressureThresholds::default().classify(used as f64 / max_memory as f64);
        prop_assert_eq!(stats.pressure_level, expected);
        prop_assert_eq!(manager.pressure_level(), expected);
    }

    /// A granted request always fits in the remaining headroom
    #[test]
    fn prop_granted_requests_fit(
        max_memory in 1u64..100_000,
        used in 0u64..150_000,
        request in 0u64..150_000,
    ) {
        let manager = manager(max_memory, false);
        manager.update_usage(used as i64, None);

        let granted = manager.request_memory(request);
        prop_assert_eq!(granted, manager.has_enough_memory(request));
        prop_assert_eq!(granted, used + request <= max_memory);
    }

    /// Critical pressure always triggers a cleanup when auto response is on
    #[test]
    fn prop_critical_updates_clean_up(updates in 1usize..20) {
        let manager = manager(1_000, true);
        manager.update_usage(960, None);
        for _ in 1..updates {
            manager.update_usage(1, None);
        }

        prop_assert_eq!(manager.pressure_level(), MemoryPressure::Critical);
        prop_assert_eq!(manager.stats().cleanup_count, updates as u64);
    }
}
