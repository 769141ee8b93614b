//! Approximate byte footprint of cached values

use crate::errors::Result;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

pub const NULL_SIZE: u64 = 0;
pub const BOOL_SIZE: u64 = 4;
pub const NUMBER_SIZE: u64 = 8;
pub const STRING_OVERHEAD: u64 = 24;
pub const ARRAY_OVERHEAD: u64 = 24;
pub const OBJECT_OVERHEAD: u64 = 32;

/// Estimates how many bytes a value occupies.
///
/// Shared values passed through [`estimate_shared`](Self::estimate_shared)
/// are memoized per allocation. The memo holds `Weak` references only, so it
/// never keeps a value alive, and entries whose value was dropped are
/// recomputed and pruned.
#[derive(Default)]
pub struct SizeEstimator {
    memo: Mutex<HashMap<usize, (Weak<Value>, u64)>>,
}

impl SizeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(&self, value: &Value) -> u64 {
        estimate_value(value)
    }

    /// Estimate a shared value, reusing the result for the same allocation
    pub fn estimate_shared(&self, value: &Arc<Value>) -> u64 {
        let id = Arc::as_ptr(value) as usize;
        let mut memo = self.memo.lock();

        // A live Weak pins the allocation, so the address cannot be reused
        // by another value while the entry exists.
        if let Some((weak, size)) = memo.get(&id) {
            if weak.upgrade().is_some() {
                return *size;
            }
        }

        let size = estimate_value(value);
        memo.insert(id, (Arc::downgrade(value), size));
        if memo.len() > 64 {
            memo.retain(|_, (weak, _)| weak.strong_count() > 0);
        }
        size
    }

    /// Estimate any serializable value through its JSON form
    pub fn estimate_serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<u64> {
        let json = serde_json::to_value(value)?;
        Ok(estimate_value(&json))
    }

    /// Number of memo entries, live or stale
    pub fn memo_len(&self) -> usize {
        self.memo.lock().len()
    }

    /// Drop memo entries whose value no longer exists
    pub fn prune(&self) {
        self.memo.lock().retain(|_, (weak, _)| weak.strong_count() > 0);
    }
}

fn estimate_str(s: &str) -> u64 {
    // UTF-8 length is already the per-codepoint 1/2/3/4 byte width sum
    s.len() as u64 + STRING_OVERHEAD
}

fn estimate_value(value: &Value) -> u64 {
    match value {
        Value::Null => NULL_SIZE,
        Value::Bool(_) => BOOL_SIZE,
        Value::Number(_) => NUMBER_SIZE,
        Value::String(s) => estimate_str(s),
        Value::Array(items) => ARRAY_OVERHEAD + items.iter().map(estimate_value).sum::<u64>(),
        Value::Object(map) => {
            OBJECT_OVERHEAD
                + map
                    .iter()
                    .map(|(key, value)| estimate_str(key) + estimate_value(value))
                    .sum::<u64>()
        }
    }
}
