//! Error handling for the eviction and memory-pressure core
//!
//! Every error carries a recovery hint so callers (usually the cache
//! orchestrator) can decide whether to fall back, retry or give up.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
