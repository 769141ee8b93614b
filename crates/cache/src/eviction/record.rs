//! Access bookkeeping shared by the strategy implementations

use super::types::EvictionMetadata;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub(crate) struct AccessRecord {
    pub added_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub insertion_order: u64,
}

impl AccessRecord {
    pub fn new(insertion_order: u64) -> Self {
        let now = Utc::now();
        Self {
            added_at: now,
            last_accessed: now,
            access_count: 0,
            insertion_order,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
        self.access_count += 1;
    }

    pub fn to_metadata(&self, key: &str) -> EvictionMetadata {
        EvictionMetadata {
            key: key.to_string(),
            added_at: self.added_at,
            last_accessed: self.last_accessed,
            access_count: self.access_count,
            insertion_order: self.insertion_order,
            frequency: None,
            expires_at: None,
            segment: None,
        }
    }
}

/// Monotonic insertion counter
#[derive(Debug, Default)]
pub(crate) struct Sequence(u64);

impl Sequence {
    pub fn next(&mut self) -> u64 {
        let value = self.0;
        self.0 += 1;
        value
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}
