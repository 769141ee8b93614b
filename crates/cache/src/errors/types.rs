//! Core error types for the cache core

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cache core operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for the eviction and memory-pressure core
#[derive(Debug)]
pub enum CacheError {
    /// Invalid configuration (thresholds, limits, unparsable overrides)
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },

    /// The strategy factory has no constructor registered under this name
    UnknownStrategy {
        name: String,
        available: Vec<String>,
        recovery_hint: RecoveryHint,
    },

    /// Memory request could not be satisfied even after cleanup
    CapacityExceeded {
        requested_bytes: u64,
        available_bytes: u64,
        recovery_hint: RecoveryHint,
    },

    /// Serialization/deserialization errors
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// I/O errors while loading configuration
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// A storage backend refused an operation
    StoreUnavailable {
        store: String,
        operation: &'static str,
        reason: String,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Use a default value
    UseDefault { value: String },

    /// Increase the memory limit
    IncreaseCapacity { suggested_bytes: u64 },

    /// Run cache eviction before retrying
    RunEviction,

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Update cache configuration
    UpdateConfiguration,

    /// Use fallback backend
    UseFallback,

    /// No automated recovery possible
    Manual { instructions: String },

    /// Operation can be safely ignored
    Ignore,
}

/// Serialization operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationOp {
    Encode,
    Decode,
}
