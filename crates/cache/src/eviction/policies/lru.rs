//! LRU (Least Recently Used) eviction strategy implementation

use crate::eviction::record::{AccessRecord, Sequence};
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{EntryHint, EvictionMetadata, StrategyStats};
use lru::LruCache;
use parking_lot::Mutex;

pub const LRU: &str = "lru";

/// LRU (Least Recently Used) eviction strategy
pub struct LruStrategy {
    state: Mutex<RecencyState>,
}

/// Recency ordering, most recent at the head of the list
struct RecencyState {
    order: LruCache<String, AccessRecord>,
    sequence: Sequence,
}

impl LruStrategy {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecencyState {
                order: LruCache::unbounded(),
                sequence: Sequence::default(),
            }),
        }
    }

    /// Keys ordered by recency, oldest first unless `newest_first`
    pub(crate) fn keys_by_recency(&self, count: usize, newest_first: bool) -> Vec<String> {
        let state = self.state.lock();
        let keys = state.order.iter().map(|(key, _)| key.clone());
        if newest_first {
            keys.take(count).collect()
        } else {
            keys.rev().take(count).collect()
        }
    }

    pub(crate) fn metadata_by_recency(&self, newest_first: bool) -> Vec<EvictionMetadata> {
        let state = self.state.lock();
        let records = state.order.iter().map(|(key, record)| record.to_metadata(key));
        if newest_first {
            records.collect()
        } else {
            records.rev().collect()
        }
    }
}

impl Default for LruStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionStrategy for LruStrategy {
    fn name(&self) -> &str {
        LRU
    }

    fn record_add(&self, key: &str, _hint: Option<&EntryHint>) {
        let mut state = self.state.lock();

        if let Some(record) = state.order.get_mut(key) {
            record.touch();
            return;
        }

        let order = state.sequence.next();
        state.order.put(key.to_string(), AccessRecord::new(order));
    }

    fn record_access(&self, key: &str) {
        // get_mut moves the key to the most recent end
        if let Some(record) = self.state.lock().order.get_mut(key) {
            record.touch();
        }
    }

    fn record_remove(&self, key: &str) {
        self.state.lock().order.pop(key);
    }

    fn eviction_keys(&self, count: usize) -> Vec<String> {
        self.keys_by_recency(count, false)
    }

    fn metadata(&self) -> Vec<EvictionMetadata> {
        self.metadata_by_recency(false)
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats::basic(LRU, self.len())
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.order.clear();
        state.sequence.reset();
    }

    fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.state.lock().order.contains(key)
    }
}
