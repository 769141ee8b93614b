//! Registry for creating eviction strategies by name

use crate::errors::{CacheError, RecoveryHint, Result};
use indexmap::IndexMap;
use std::sync::Arc;

use super::policies::{
    ArcStrategy, FifoStrategy, LfuStrategy, LruStrategy, MruStrategy, RandomStrategy,
    TtlStrategy, ARC, DEFAULT_ARC_CAPACITY, FIFO, LFU, LRU, MRU, RANDOM, TTL,
};
use super::traits::EvictionStrategy;

/// Built-in strategy names, in listing order
pub const BUILTIN_STRATEGIES: [&str; 7] = [LRU, LFU, FIFO, MRU, RANDOM, TTL, ARC];

/// Constructor stored in the registry
pub type StrategyConstructor = Arc<dyn Fn() -> Box<dyn EvictionStrategy> + Send + Sync>;

/// Name-to-constructor registry.
///
/// Any type implementing [`EvictionStrategy`] can be registered; names are
/// matched case-insensitively.
pub struct EvictionStrategyFactory {
    constructors: IndexMap<String, StrategyConstructor>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl EvictionStrategyFactory {
    /// Factory with every built-in strategy registered
    pub fn new() -> Self {
        Self::with_arc_capacity(DEFAULT_ARC_CAPACITY)
    }

    /// Like [`new`](Self::new), with the capacity handed to ARC instances
    pub fn with_arc_capacity(arc_capacity: usize) -> Self {
        let mut factory = Self {
            constructors: IndexMap::new(),
        };

        factory
            .register(LRU, || Box::new(LruStrategy::new()))
            .register(LFU, || Box::new(LfuStrategy::new()))
            .register(FIFO, || Box::new(FifoStrategy::new()))
            .register(MRU, || Box::new(MruStrategy::new()))
            .register(RANDOM, || Box::new(RandomStrategy::new()))
            .register(TTL, || Box::new(TtlStrategy::new()))
            .register(ARC, move || Box::new(ArcStrategy::new(arc_capacity)));

        factory
    }

    /// Add or replace a constructor. Replacing keeps the listing position.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn EvictionStrategy> + Send + Sync + 'static,
    {
        let name = normalize(name);
        if self.constructors.contains_key(&name) {
            tracing::debug!("Overriding eviction strategy '{}'", name);
        }
        self.constructors.insert(name, Arc::new(constructor));
        self
    }

    /// Instantiate a registered strategy
    pub fn create(&self, name: &str) -> Result<Box<dyn EvictionStrategy>> {
        match self.constructors.get(&normalize(name)) {
            Some(constructor) => Ok(constructor()),
            None => Err(CacheError::UnknownStrategy {
                name: name.to_string(),
                available: self.available_strategies(),
                recovery_hint: RecoveryHint::UseDefault {
                    value: LRU.to_string(),
                },
            }),
        }
    }

    /// Registered names, built-ins first
    pub fn available_strategies(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&normalize(name))
    }
}

impl Default for EvictionStrategyFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a built-in strategy without keeping a factory around
pub fn create_strategy(name: &str) -> Result<Box<dyn EvictionStrategy>> {
    EvictionStrategyFactory::new().create(name)
}
