//! Pooled records handed out by the memory manager

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bookkeeping attached to a cached entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub key: String,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub expires_at: Option<DateTime<Utc>>,
    /// Storage backend holding the entry
    pub engine: Option<String>,
}

impl ItemMetadata {
    /// Clear every field, keeping the key's allocation for reuse
    pub fn reset(&mut self) {
        self.key.clear();
        self.size = 0;
        self.created_at = None;
        self.last_accessed = None;
        self.access_count = 0;
        self.expires_at = None;
        self.engine = None;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A cached value together with its metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheItem {
    pub key: String,
    pub value: Value,
    pub metadata: ItemMetadata,
}

impl CacheItem {
    pub fn reset(&mut self) {
        self.key.clear();
        self.value = Value::Null;
        self.metadata.reset();
    }
}
