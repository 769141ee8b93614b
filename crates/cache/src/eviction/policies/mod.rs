//! Eviction strategy implementations

mod arc;
mod fifo;
mod lfu;
mod lru;
mod mru;
mod random;
mod ttl;

pub use arc::{ArcStrategy, ARC, DEFAULT_ARC_CAPACITY};
pub use fifo::{FifoStrategy, FIFO};
pub use lfu::{LfuStrategy, LFU};
pub use lru::{LruStrategy, LRU};
pub use mru::{MruStrategy, MRU};
pub use random::{RandomStrategy, RANDOM};
pub use ttl::{TtlStrategy, TTL};
