//! Random eviction strategy implementation

use crate::eviction::record::{AccessRecord, Sequence};
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{EntryHint, EvictionMetadata, StrategyStats};
use indexmap::IndexMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const RANDOM: &str = "random";

/// Uniform random eviction. Batch picks are drawn without replacement.
pub struct RandomStrategy {
    state: Mutex<RandomState>,
}

struct RandomState {
    keys: IndexMap<String, AccessRecord>,
    sequence: Sequence,
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic picks for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(RandomState {
                keys: IndexMap::new(),
                sequence: Sequence::default(),
                rng,
            }),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionStrategy for RandomStrategy {
    fn name(&self) -> &str {
        RANDOM
    }

    fn record_add(&self, key: &str, _hint: Option<&EntryHint>) {
        let mut state = self.state.lock();

        if let Some(record) = state.keys.get_mut(key) {
            record.touch();
            return;
        }

        let order = state.sequence.next();
        state.keys.insert(key.to_string(), AccessRecord::new(order));
    }

    fn record_access(&self, key: &str) {
        if let Some(record) = self.state.lock().keys.get_mut(key) {
            record.touch();
        }
    }

    fn record_remove(&self, key: &str) {
        // Order is irrelevant here, so the O(1) removal is fine
        self.state.lock().keys.swap_remove(key);
    }

    fn eviction_key(&self) -> Option<String> {
        let mut state = self.state.lock();
        if state.keys.is_empty() {
            return None;
        }

        let len = state.keys.len();
        let index = state.rng.gen_range(0..len);
        state.keys.get_index(index).map(|(key, _)| key.clone())
    }

    fn eviction_keys(&self, count: usize) -> Vec<String> {
        let mut state = self.state.lock();
        let len = state.keys.len();
        let amount = count.min(len);
        if amount == 0 {
            return Vec::new();
        }

        let picks = rand::seq::index::sample(&mut state.rng, len, amount);
        picks
            .into_iter()
            .filter_map(|index| state.keys.get_index(index).map(|(key, _)| key.clone()))
            .collect()
    }

    fn metadata(&self) -> Vec<EvictionMetadata> {
        self.state
            .lock()
            .keys
            .iter()
            .map(|(key, record)| record.to_metadata(key))
            .collect()
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats::basic(RANDOM, self.len())
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.keys.clear();
        state.sequence.reset();
    }

    fn len(&self) -> usize {
        self.state.lock().keys.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.state.lock().keys.contains_key(key)
    }
}
