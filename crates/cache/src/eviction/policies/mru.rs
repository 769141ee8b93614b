//! MRU (Most Recently Used) eviction strategy implementation

use super::lru::LruStrategy;
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{EntryHint, EvictionMetadata, StrategyStats};

pub const MRU: &str = "mru";

/// MRU (Most Recently Used) eviction strategy.
///
/// Shares the recency bookkeeping of [`LruStrategy`] and reads it from the
/// opposite end. Useful for cyclic scans where the newest entry is the one
/// least likely to be needed again.
pub struct MruStrategy {
    recency: LruStrategy,
}

impl MruStrategy {
    pub fn new() -> Self {
        Self {
            recency: LruStrategy::new(),
        }
    }
}

impl Default for MruStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionStrategy for MruStrategy {
    fn name(&self) -> &str {
        MRU
    }

    fn record_add(&self, key: &str, hint: Option<&EntryHint>) {
        self.recency.record_add(key, hint);
    }

    fn record_access(&self, key: &str) {
        self.recency.record_access(key);
    }

    fn record_remove(&self, key: &str) {
        self.recency.record_remove(key);
    }

    fn eviction_keys(&self, count: usize) -> Vec<String> {
        self.recency.keys_by_recency(count, true)
    }

    fn metadata(&self) -> Vec<EvictionMetadata> {
        self.recency.metadata_by_recency(true)
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats::basic(MRU, self.len())
    }

    fn clear(&self) {
        self.recency.clear();
    }

    fn len(&self) -> usize {
        self.recency.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.recency.contains(key)
    }
}
