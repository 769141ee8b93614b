//! Core eviction strategy trait definition

use super::types::{EntryHint, EvictionMetadata, StrategyStats};

/// Eviction strategy contract shared by every policy.
///
/// Implementations keep their own per-key bookkeeping and never touch the
/// cached values themselves. The orchestrator reports adds, touches and
/// removals, and asks for candidates when capacity runs out. All methods take
/// `&self`; implementations guard their state with a single lock so one
/// instance can be shared across threads.
pub trait EvictionStrategy: Send + Sync {
    /// Stable identifier, matching the name the strategy is registered under
    fn name(&self) -> &str;

    /// Start tracking a key. Re-adding a tracked key counts as a touch.
    fn record_add(&self, key: &str, hint: Option<&EntryHint>);

    /// Record a read/write touch. Untracked keys are ignored.
    fn record_access(&self, key: &str);

    /// Stop tracking a key
    fn record_remove(&self, key: &str);

    /// Best eviction candidate, or `None` when nothing is tracked
    fn eviction_key(&self) -> Option<String> {
        self.eviction_keys(1).into_iter().next()
    }

    /// Up to `count` distinct candidates in eviction order.
    ///
    /// The result matches `count` rounds of [`eviction_key`](Self::eviction_key)
    /// followed by [`record_remove`](Self::record_remove), without mutating
    /// any tracking state.
    fn eviction_keys(&self, count: usize) -> Vec<String>;

    /// Per-key diagnostic records, in eviction order where one exists
    fn metadata(&self) -> Vec<EvictionMetadata>;

    /// Counters for diagnostics
    fn stats(&self) -> StrategyStats;

    /// Drop all tracking data
    fn clear(&self);

    /// Number of tracked keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the key is currently tracked
    fn contains(&self, key: &str) -> bool;
}
