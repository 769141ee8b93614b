//! FIFO (First In, First Out) eviction strategy implementation

use crate::eviction::record::{AccessRecord, Sequence};
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{EntryHint, EvictionMetadata, StrategyStats};
use indexmap::IndexMap;
use parking_lot::Mutex;

pub const FIFO: &str = "fifo";

/// FIFO eviction strategy. Accesses are recorded but never reorder keys.
pub struct FifoStrategy {
    state: Mutex<FifoState>,
}

#[derive(Default)]
struct FifoState {
    queue: IndexMap<String, AccessRecord>,
    sequence: Sequence,
}

impl FifoStrategy {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FifoState::default()),
        }
    }
}

impl Default for FifoStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionStrategy for FifoStrategy {
    fn name(&self) -> &str {
        FIFO
    }

    fn record_add(&self, key: &str, _hint: Option<&EntryHint>) {
        let mut state = self.state.lock();

        if let Some(record) = state.queue.get_mut(key) {
            record.touch();
            return;
        }

        let order = state.sequence.next();
        state.queue.insert(key.to_string(), AccessRecord::new(order));
    }

    fn record_access(&self, key: &str) {
        if let Some(record) = self.state.lock().queue.get_mut(key) {
            record.touch();
        }
    }

    fn record_remove(&self, key: &str) {
        // shift_remove keeps the remaining insertion order intact
        self.state.lock().queue.shift_remove(key);
    }

    fn eviction_keys(&self, count: usize) -> Vec<String> {
        self.state.lock().queue.keys().take(count).cloned().collect()
    }

    fn metadata(&self) -> Vec<EvictionMetadata> {
        self.state
            .lock()
            .queue
            .iter()
            .map(|(key, record)| record.to_metadata(key))
            .collect()
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats::basic(FIFO, self.len())
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.queue.clear();
        state.sequence.reset();
    }

    fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.state.lock().queue.contains_key(key)
    }
}
