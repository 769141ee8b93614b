//! Eviction and memory management for memtide caches
//!
//! This crate provides:
//! - Eviction strategies (LRU, LFU, FIFO, MRU, Random, TTL, ARC) behind one trait
//! - A name-based strategy registry
//! - Value size estimation and object pooling
//! - A memory manager with pressure levels, listeners and scheduled cleanup

pub mod config;
pub mod engine;
pub mod errors;
pub mod eviction;
pub mod memory;

pub use config::{ConfigSource, LoadedConfig, MemoryConfig, MemoryConfigBuilder, MemoryConfigLoader};
pub use engine::{evict_batch, InMemoryEngine, StorageEngine};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use eviction::*;
pub use memory::*;
