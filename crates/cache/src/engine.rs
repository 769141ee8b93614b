//! Storage engines evicted by strategies

use crate::errors::Result;
use crate::eviction::EvictionStrategy;
use dashmap::DashMap;
use serde_json::Value;

/// Key-value backend consulted by the eviction loop
pub trait StorageEngine: Send + Sync {
    /// Engine name used for per-engine usage accounting
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key, returning whether it was present
    fn delete(&self, key: &str) -> Result<bool>;

    fn clear(&self) -> Result<()>;
}

/// Concurrent in-process engine
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    entries: DashMap<String, Value>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageEngine for InMemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Evict up to `count` keys chosen by `strategy` from `engine`.
///
/// Each key is deleted first and only then forgotten by the strategy, so a
/// failed delete leaves both sides tracking the key. Returns the keys that
/// were evicted.
pub fn evict_batch(
    strategy: &dyn EvictionStrategy,
    engine: &dyn StorageEngine,
    count: usize,
) -> Vec<String> {
    let mut evicted = Vec::with_capacity(count);

    for key in strategy.eviction_keys(count) {
        match engine.delete(&key) {
            Ok(_) => {
                strategy.record_remove(&key);
                evicted.push(key);
            }
            Err(e) => {
                tracing::warn!("Failed to evict {} from {}: {}", key, engine.name(), e);
            }
        }
    }

    if !evicted.is_empty() {
        tracing::debug!(
            strategy = strategy.name(),
            engine = engine.name(),
            "Evicted {} entries",
            evicted.len()
        );
    }

    evicted
}
