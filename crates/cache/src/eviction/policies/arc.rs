//! ARC (Adaptive Replacement Cache) eviction strategy implementation

use crate::eviction::record::{AccessRecord, Sequence};
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{
    ArcSegment, ArcStats, EntryHint, EvictionMetadata, StrategyStats,
};
use lru::LruCache;
use parking_lot::Mutex;

pub const ARC: &str = "arc";

/// Capacity used when the caller does not size the strategy
pub const DEFAULT_ARC_CAPACITY: usize = 1024;

/// ARC (Adaptive Replacement Cache) eviction strategy.
///
/// Resident keys live in T1 (seen once) or T2 (seen again). Evicted ids are
/// remembered in the ghost lists B1/B2 without values. A later add that hits
/// a ghost list moves the target size `p` of T1 toward the list that produced
/// the hit, which is how the policy balances recency against frequency.
pub struct ArcStrategy {
    state: Mutex<ArcState>,
}

struct ArcState {
    /// c: expected number of resident keys, bounds the ghost lists
    capacity: usize,
    /// p: adaptive target size for T1
    target_recent: usize,
    /// T1: recent cache entries
    t1: LruCache<String, AccessRecord>,
    /// T2: frequent cache entries
    t2: LruCache<String, AccessRecord>,
    /// B1: ghost entries recently evicted from T1
    b1: LruCache<String, ()>,
    /// B2: ghost entries recently evicted from T2
    b2: LruCache<String, ()>,
    hits: u64,
    misses: u64,
    b1_hits: u64,
    b2_hits: u64,
    sequence: Sequence,
}

impl ArcState {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            target_recent: 0,
            t1: LruCache::unbounded(),
            t2: LruCache::unbounded(),
            b1: LruCache::unbounded(),
            b2: LruCache::unbounded(),
            hits: 0,
            misses: 0,
            b1_hits: 0,
            b2_hits: 0,
            sequence: Sequence::default(),
        }
    }

    /// Adjust p on a ghost hit; ghost sizes are measured before the key leaves
    fn adapt(&mut self, in_b1: bool) {
        if in_b1 {
            // Increase p (favor recency)
            let delta = 1.max(self.b2.len() / self.b1.len().max(1));
            self.target_recent = (self.target_recent + delta).min(self.capacity);
        } else {
            // Decrease p (favor frequency)
            let delta = 1.max(self.b1.len() / self.b2.len().max(1));
            self.target_recent = self.target_recent.saturating_sub(delta);
        }
    }

    fn touch(&mut self, key: &str) -> bool {
        if let Some((owned, mut record)) = self.t1.pop_entry(key) {
            record.touch();
            self.t2.put(owned, record);
            return true;
        }

        if let Some(record) = self.t2.get_mut(key) {
            record.touch();
            return true;
        }

        false
    }

    /// |T1| + |B1| <= c and |T1| + |T2| + |B1| + |B2| <= 2c
    fn trim_ghosts(&mut self) {
        while self.t1.len() + self.b1.len() > self.capacity && self.b1.pop_lru().is_some() {}

        let limit = self.capacity * 2;
        while self.t1.len() + self.t2.len() + self.b1.len() + self.b2.len() > limit {
            if self.b2.pop_lru().is_none() && self.b1.pop_lru().is_none() {
                break;
            }
        }
    }

    fn prefers_recent(&self, t1_len: usize, t2_len: usize) -> bool {
        t1_len > 0 && (t1_len > self.target_recent || t2_len == 0)
    }
}

impl ArcStrategy {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(ArcState::new(capacity.max(1))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Current adaptive target size for the recency list
    pub fn target_recent(&self) -> usize {
        self.state.lock().target_recent
    }

    pub fn is_ghost(&self, key: &str) -> bool {
        let state = self.state.lock();
        state.b1.contains(key) || state.b2.contains(key)
    }
}

impl Default for ArcStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_ARC_CAPACITY)
    }
}

impl EvictionStrategy for ArcStrategy {
    fn name(&self) -> &str {
        ARC
    }

    fn record_add(&self, key: &str, _hint: Option<&EntryHint>) {
        let mut state = self.state.lock();

        if state.touch(key) {
            state.hits += 1;
            return;
        }

        state.misses += 1;
        let order = state.sequence.next();

        if state.b1.contains(key) {
            state.b1_hits += 1;
            state.adapt(true);
            state.b1.pop(key);
            state.t2.put(key.to_string(), AccessRecord::new(order));
        } else if state.b2.contains(key) {
            state.b2_hits += 1;
            state.adapt(false);
            state.b2.pop(key);
            state.t2.put(key.to_string(), AccessRecord::new(order));
        } else {
            state.t1.put(key.to_string(), AccessRecord::new(order));
        }

        state.trim_ghosts();
    }

    fn record_access(&self, key: &str) {
        let mut state = self.state.lock();
        if state.touch(key) {
            state.hits += 1;
        }
    }

    fn record_remove(&self, key: &str) {
        let mut state = self.state.lock();

        if let Some((owned, _)) = state.t1.pop_entry(key) {
            state.b1.put(owned, ());
        } else if let Some((owned, _)) = state.t2.pop_entry(key) {
            state.b2.put(owned, ());
        } else {
            return;
        }

        state.trim_ghosts();
    }

    fn eviction_keys(&self, count: usize) -> Vec<String> {
        let state = self.state.lock();

        // Removals never move p, so replaying REPLACE only needs the two
        // lengths and a cursor into each list's LRU end.
        let mut t1_len = state.t1.len();
        let mut t2_len = state.t2.len();
        let mut t1_keys = state.t1.iter().rev().map(|(key, _)| key);
        let mut t2_keys = state.t2.iter().rev().map(|(key, _)| key);
        let mut picks = Vec::with_capacity(count.min(t1_len + t2_len));

        while picks.len() < count {
            let next = if state.prefers_recent(t1_len, t2_len) {
                t1_len -= 1;
                t1_keys.next()
            } else if t2_len > 0 {
                t2_len -= 1;
                t2_keys.next()
            } else {
                None
            };

            match next {
                Some(key) => picks.push(key.clone()),
                None => break,
            }
        }

        picks
    }

    fn metadata(&self) -> Vec<EvictionMetadata> {
        let state = self.state.lock();
        let recent = state.t1.iter().rev().map(|(key, record)| EvictionMetadata {
            segment: Some(ArcSegment::Recent),
            ..record.to_metadata(key)
        });
        let frequent = state.t2.iter().rev().map(|(key, record)| EvictionMetadata {
            segment: Some(ArcSegment::Frequent),
            ..record.to_metadata(key)
        });
        recent.chain(frequent).collect()
    }

    fn stats(&self) -> StrategyStats {
        let state = self.state.lock();
        StrategyStats {
            name: ARC.to_string(),
            total_items: state.t1.len() + state.t2.len(),
            hits: state.hits,
            misses: state.misses,
            arc: Some(ArcStats {
                capacity: state.capacity,
                target_recent: state.target_recent,
                recent_len: state.t1.len(),
                frequent_len: state.t2.len(),
                recent_ghost_len: state.b1.len(),
                frequent_ghost_len: state.b2.len(),
                recent_ghost_hits: state.b1_hits,
                frequent_ghost_hits: state.b2_hits,
            }),
        }
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        let capacity = state.capacity;
        *state = ArcState::new(capacity);
    }

    fn len(&self) -> usize {
        let state = self.state.lock();
        state.t1.len() + state.t2.len()
    }

    fn contains(&self, key: &str) -> bool {
        let state = self.state.lock();
        state.t1.contains(key) || state.t2.contains(key)
    }
}
