//! Data carried in and out of eviction strategies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy-specific hints passed along with `record_add`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHint {
    /// Absolute expiry, honoured by the TTL strategy
    pub expires_at: Option<DateTime<Utc>>,
}

impl EntryHint {
    pub fn expiring_at(expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: Some(expires_at),
        }
    }

    /// Expire `ttl` from now. A ttl too large to represent never expires.
    pub fn expiring_in(ttl: Duration) -> Self {
        Self {
            expires_at: expiry_after(Utc::now(), ttl),
        }
    }
}

pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
}

/// ARC segment a resident key lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcSegment {
    /// T1: seen once since admission
    Recent,
    /// T2: seen at least twice
    Frequent,
}

/// Per-key diagnostic record.
///
/// The shape varies by strategy: fields a strategy does not track are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictionMetadata {
    pub key: String,
    pub added_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub insertion_order: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<ArcSegment>,
}

/// Strategy counters.
///
/// `hits` and `misses` are only maintained by ARC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStats {
    pub name: String,
    pub total_items: usize,
    pub hits: u64,
    pub misses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc: Option<ArcStats>,
}

impl StrategyStats {
    pub(crate) fn basic(name: &str, total_items: usize) -> Self {
        Self {
            name: name.to_string(),
            total_items,
            hits: 0,
            misses: 0,
            arc: None,
        }
    }

    /// Hit ratio over recorded hits and misses, 0.0 when nothing was recorded
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// ARC internals exposed for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcStats {
    pub capacity: usize,
    /// Adaptive target size for the recency list
    pub target_recent: usize,
    pub recent_len: usize,
    pub frequent_len: usize,
    pub recent_ghost_len: usize,
    pub frequent_ghost_len: usize,
    pub recent_ghost_hits: u64,
    pub frequent_ghost_hits: u64,
}
