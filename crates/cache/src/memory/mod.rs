//! Memory accounting for cache instances
//!
//! - `size`: byte estimates for cached values
//! - `pool`: reusable object pools
//! - `pressure`: usage classification
//! - `manager`: usage tracking, listeners and cleanup scheduling

mod items;
mod manager;
mod pool;
mod pressure;
mod size;

pub use items::{CacheItem, ItemMetadata};
pub use manager::{CleanupReport, MemoryManager, MemoryStats, PressureListener, PressureSubscription};
pub use pool::{ObjectPool, PoolStats};
pub use pressure::{MemoryPressure, PressureThresholds};
pub use size::{
    SizeEstimator, ARRAY_OVERHEAD, BOOL_SIZE, NULL_SIZE, NUMBER_SIZE, OBJECT_OVERHEAD,
    STRING_OVERHEAD,
};
