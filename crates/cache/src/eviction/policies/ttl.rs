//! TTL (time-to-live) eviction strategy implementation

use crate::eviction::record::{AccessRecord, Sequence};
use crate::eviction::traits::EvictionStrategy;
use crate::eviction::types::{expiry_after, EntryHint, EvictionMetadata, StrategyStats};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

pub const TTL: &str = "ttl";

/// Sort key for expiry. `Never` orders after every concrete deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Expiry {
    At(DateTime<Utc>),
    Never,
}

impl From<Option<DateTime<Utc>>> for Expiry {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Never, Self::At)
    }
}

/// Evicts the soonest (or most overdue) expiry first.
///
/// Expired keys naturally sort ahead of live ones because their deadline is
/// in the past. Keys without an expiry go last; ties break on insertion order.
pub struct TtlStrategy {
    state: Mutex<TtlState>,
    default_ttl: Option<Duration>,
}

struct TtlEntry {
    record: AccessRecord,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct TtlState {
    entries: HashMap<String, TtlEntry>,
    ranking: BTreeSet<(Expiry, u64, String)>,
    sequence: Sequence,
}

impl TtlStrategy {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TtlState::default()),
            default_ttl: None,
        }
    }

    /// Keys added without an explicit expiry expire `ttl` after insertion
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            default_ttl: Some(ttl),
            ..Self::new()
        }
    }

    fn resolve_expiry(&self, hint: Option<&EntryHint>) -> Option<DateTime<Utc>> {
        hint.and_then(|h| h.expires_at).or_else(|| {
            self.default_ttl
                .and_then(|ttl| expiry_after(Utc::now(), ttl))
        })
    }

    /// Tracked keys whose expiry is at or before `now`, most overdue first
    pub fn expired_keys(&self, now: DateTime<Utc>) -> Vec<String> {
        self.state
            .lock()
            .ranking
            .iter()
            .take_while(|(expiry, _, _)| matches!(expiry, Expiry::At(at) if *at <= now))
            .map(|(_, _, key)| key.clone())
            .collect()
    }
}

impl Default for TtlStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionStrategy for TtlStrategy {
    fn name(&self) -> &str {
        TTL
    }

    fn record_add(&self, key: &str, hint: Option<&EntryHint>) {
        let mut state = self.state.lock();

        if let Some(entry) = state.entries.get_mut(key) {
            entry.record.touch();
            if hint.is_none() {
                return;
            }

            // A fresh hint replaces the previous deadline
            let previous = (
                Expiry::from(entry.expires_at),
                entry.record.insertion_order,
                key.to_string(),
            );
            entry.expires_at = self.resolve_expiry(hint);
            let updated = (
                Expiry::from(entry.expires_at),
                entry.record.insertion_order,
                key.to_string(),
            );
            state.ranking.remove(&previous);
            state.ranking.insert(updated);
            return;
        }

        let order = state.sequence.next();
        let expires_at = self.resolve_expiry(hint);
        state
            .ranking
            .insert((Expiry::from(expires_at), order, key.to_string()));
        state.entries.insert(
            key.to_string(),
            TtlEntry {
                record: AccessRecord::new(order),
                expires_at,
            },
        );
    }

    fn record_access(&self, key: &str) {
        if let Some(entry) = self.state.lock().entries.get_mut(key) {
            entry.record.touch();
        }
    }

    fn record_remove(&self, key: &str) {
        let mut state = self.state.lock();
        if let Some(entry) = state.entries.remove(key) {
            state.ranking.remove(&(
                Expiry::from(entry.expires_at),
                entry.record.insertion_order,
                key.to_string(),
            ));
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
                expires_at: entry.expires_at,
                ..entry.record.to_metadata(key)
            })
            .collect()
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats::basic(TTL, self.len())
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
