//! LFU (Least Frequently Used) eviction strategy implementation

use crate::eviction::record::{AccessRecord, Sequence};
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{EntryHint, EvictionMetadata, StrategyStats};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

pub const LFU: &str = "lfu";

/// LFU (Least Frequently Used) eviction strategy.
///
/// Ties on frequency go to the earliest inserted key.
pub struct LfuStrategy {
    state: Mutex<LfuState>,
}

struct LfuEntry {
    record: AccessRecord,
    frequency: u64,
}

#[derive(Default)]
struct LfuState {
    entries: HashMap<String, LfuEntry>,
    /// (frequency, insertion order, key), lowest first
    ranking: BTreeSet<(u64, u64, String)>,
    sequence: Sequence,
}

impl LfuState {
    fn bump(&mut self, key: &str) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };

        self.ranking
            .remove(&(entry.frequency, entry.record.insertion_order, key.to_string()));
        entry.frequency += 1;
        entry.record.touch();
        self.ranking
            .insert((entry.frequency, entry.record.insertion_order, key.to_string()));
    }
}

impl LfuStrategy {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LfuState::default()),
        }
    }
}

impl Default for LfuStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionStrategy for LfuStrategy {
    fn name(&self) -> &str {
        LFU
    }

    fn record_add(&self, key: &str, _hint: Option<&EntryHint>) {
        let mut state = self.state.lock();

        if state.entries.contains_key(key) {
            state.bump(key);
            return;
        }

        let order = state.sequence.next();
        state.ranking.insert((1, order, key.to_string()));
        state.entries.insert(
            key.to_string(),
            LfuEntry {
                record: AccessRecord::new(order),
                frequency: 1,
            },
        );
    }

    fn record_access(&self, key: &str) {
        self.state.lock().bump(key);
    }

    fn record_remove(&self, key: &str) {
        let mut state = self.state.lock();
        if let Some(entry) = state.entries.remove(key) {
            state
                .ranking
                .remove(&(entry.frequency, entry.record.insertion_order, key.to_string()));
        }
    }

    fn eviction_keys(&self, count: usize) -> Vec<String> {
        self.state
            .lock()
            .ranking
            .iter()
            .take(count)
            .map(|(_, _, key)| key.clone())
            .collect()
    }

    fn metadata(&self) -> Vec<EvictionMetadata> {
        let state = self.state.lock();
        state
            .ranking
            .iter()
            .filter_map(|(_, _, key)| state.entries.get(key).map(|entry| (key, entry)))
            .map(|(key, entry)| EvictionMetadata {
                frequency: Some(entry.frequency),
                ..entry.record.to_metadata(key)
            })
            .collect()
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats::basic(LFU, self.len())
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.ranking.clear();
        state.sequence.reset();
    }

    fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }
}
