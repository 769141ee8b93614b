//! Eviction strategies for cache capacity management
//!
//! Implements LRU, LFU, FIFO, MRU, Random, TTL and ARC behind the single
//! [`EvictionStrategy`] contract, plus a name-based registry for creating
//! them (and user-supplied policies) at runtime.

mod factory;
mod policies;
mod record;
mod traits;
mod types;

// Re-export public API
pub use factory::{create_strategy, EvictionStrategyFactory, StrategyConstructor, BUILTIN_STRATEGIES};
pub use policies::{
    ArcStrategy, FifoStrategy, LfuStrategy, LruStrategy, MruStrategy, RandomStrategy, TtlStrategy,
    ARC, DEFAULT_ARC_CAPACITY, FIFO, LFU, LRU, MRU, RANDOM, TTL,
};
pub use traits::EvictionStrategy;
pub use types::{ArcSegment, ArcStats, EntryHint, EvictionMetadata, StrategyStats};
