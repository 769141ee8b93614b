//! Memory manager configuration with precedence and validation
use crate::errors::{Error, RecoveryHint, Result, SerializationOp};
use crate::memory::PressureThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options recognised by the memory manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Memory limit in bytes
    pub max_memory: u64,
    /// Usage fraction where pressure becomes medium
    pub medium_pressure_threshold: f64,
    /// Usage fraction where pressure becomes high
    pub high_pressure_threshold: f64,
    /// Usage fraction where pressure becomes critical
    pub critical_pressure_threshold: f64,
    /// Background cleanup period in milliseconds, 0 disables the timer
    #[serde(rename = "autoCleanupInterval", alias = "autoCleanupIntervalMs")]
    pub auto_cleanup_interval_ms: u64,
    /// Minimum time between cleanups triggered by high pressure
    #[serde(rename = "minCleanupInterval", alias = "minCleanupIntervalMs")]
    pub min_cleanup_interval_ms: u64,
    /// React to pressure on every usage update
    pub enable_auto_pressure_response: bool,
    /// Pools holding more idle instances than this are cleared on cleanup
    pub pool_cleanup_threshold: usize,
    /// Capacity of the metadata pool
    pub metadata_pool_size: usize,
    /// Capacity of the cache item pool
    pub item_pool_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        let thresholds = PressureThresholds::default();
        Self {
            max_memory: 100 * 1024 * 1024, // 100MB
            medium_pressure_threshold: thresholds.medium,
            high_pressure_threshold: thresholds.high,
            critical_pressure_threshold: thresholds.critical,
            auto_cleanup_interval_ms: 30_000,
            min_cleanup_interval_ms: 5_000,
            enable_auto_pressure_response: true,
            pool_cleanup_threshold: 50,
            metadata_pool_size: 100,
            item_pool_size: 100,
        }
    }
}

impl MemoryConfig {
    pub fn builder() -> MemoryConfigBuilder {
        MemoryConfigBuilder::new()
    }

    pub fn thresholds(&self) -> PressureThresholds {
        PressureThresholds {
            medium: self.medium_pressure_threshold,
            high: self.high_pressure_threshold,
            critical: self.critical_pressure_threshold,
        }
    }

    /// Background timer period, `None` when disabled
    pub fn auto_cleanup_interval(&self) -> Option<Duration> {
        (self.auto_cleanup_interval_ms > 0)
            .then(|| Duration::from_millis(self.auto_cleanup_interval_ms))
    }

    pub fn min_cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.min_cleanup_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_memory == 0 {
            return Err(Error::Configuration {
                message: "maxMemory must be greater than zero".to_string(),
                recovery_hint: RecoveryHint::UseDefault {
                    value: MemoryConfig::default().max_memory.to_string(),
                },
            });
        }

        self.thresholds().validate()
    }
}

/// Builder for memory configurations
pub struct MemoryConfigBuilder {
    config: MemoryConfig,
}

impl MemoryConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MemoryConfig::default(),
        }
    }

    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.config.max_memory = bytes;
        self
    }

    pub fn with_thresholds(mut self, medium: f64, high: f64, critical: f64) -> Self {
        self.config.medium_pressure_threshold = medium;
        self.config.high_pressure_threshold = high;
        self.config.critical_pressure_threshold = critical;
        self
    }

    pub fn with_auto_cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.auto_cleanup_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_min_cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.min_cleanup_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_auto_pressure_response(mut self, enabled: bool) -> Self {
        self.config.enable_auto_pressure_response = enabled;
        self
    }

    pub fn with_pool_cleanup_threshold(mut self, threshold: usize) -> Self {
        self.config.pool_cleanup_threshold = threshold;
        self
    }

    pub fn with_pool_sizes(mut self, metadata: usize, items: usize) -> Self {
        self.config.metadata_pool_size = metadata;
        self.config.item_pool_size = items;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<MemoryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for MemoryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
}

/// A loaded configuration and every layer that contributed to it
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MemoryConfig,
    pub sources: Vec<ConfigSource>,
}

const ENV_MAX_MEMORY: &str = "MEMTIDE_MAX_MEMORY";
const ENV_MEDIUM_THRESHOLD: &str = "MEMTIDE_MEDIUM_PRESSURE_THRESHOLD";
const ENV_HIGH_THRESHOLD: &str = "MEMTIDE_HIGH_PRESSURE_THRESHOLD";
const ENV_CRITICAL_THRESHOLD: &str = "MEMTIDE_CRITICAL_PRESSURE_THRESHOLD";
const ENV_AUTO_CLEANUP_INTERVAL: &str = "MEMTIDE_AUTO_CLEANUP_INTERVAL_MS";
const ENV_MIN_CLEANUP_INTERVAL: &str = "MEMTIDE_MIN_CLEANUP_INTERVAL_MS";
const ENV_AUTO_PRESSURE_RESPONSE: &str = "MEMTIDE_AUTO_PRESSURE_RESPONSE";
const ENV_CONFIG_FILE: &str = "MEMTIDE_CONFIG";

/// Configuration loader: defaults, then config file, then environment
pub struct MemoryConfigLoader;

impl MemoryConfigLoader {
    /// Load configuration with full precedence handling
    pub fn load() -> Result<LoadedConfig> {
        let mut loaded = LoadedConfig {
            config: MemoryConfig::default(),
            sources: vec![ConfigSource::Default],
        };

        if let Some(path) = Self::config_file_path() {
            if path.exists() {
                loaded.config = Self::load_from_file(&path)?;
                loaded.sources.push(ConfigSource::ConfigFile(path));
            }
        }

        let overridden = Self::apply_env(&mut loaded.config)?;
        loaded
            .sources
            .extend(overridden.into_iter().map(|name| ConfigSource::EnvironmentVariable(name.to_string())));

        loaded.config.validate()?;
        Ok(loaded)
    }

    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<MemoryConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        serde_json::from_str(&content).map_err(|e| Error::Serialization {
            key: path.display().to_string(),
            operation: SerializationOp::Decode,
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })
    }

    /// Apply `MEMTIDE_*` overrides, returning the variables that were set
    pub fn apply_env(config: &mut MemoryConfig) -> Result<Vec<&'static str>> {
        let mut applied = Vec::new();

        if let Some(value) = read_env(ENV_MAX_MEMORY)? {
            config.max_memory = value;
            applied.push(ENV_MAX_MEMORY);
        }
        if let Some(value) = read_env(ENV_MEDIUM_THRESHOLD)? {
            config.medium_pressure_threshold = value;
            applied.push(ENV_MEDIUM_THRESHOLD);
        }
        if let Some(value) = read_env(ENV_HIGH_THRESHOLD)? {
            config.high_pressure_threshold = value;
            applied.push(ENV_HIGH_THRESHOLD);
        }
        if let Some(value) = read_env(ENV_CRITICAL_THRESHOLD)? {
            config.critical_pressure_threshold = value;
            applied.push(ENV_CRITICAL_THRESHOLD);
        }
        if let Some(value) = read_env(ENV_AUTO_CLEANUP_INTERVAL)? {
            config.auto_cleanup_interval_ms = value;
            applied.push(ENV_AUTO_CLEANUP_INTERVAL);
        }
        if let Some(value) = read_env(ENV_MIN_CLEANUP_INTERVAL)? {
            config.min_cleanup_interval_ms = value;
            applied.push(ENV_MIN_CLEANUP_INTERVAL);
        }
        if let Ok(value) = std::env::var(ENV_AUTO_PRESSURE_RESPONSE) {
            config.enable_auto_pressure_response =
                matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
            applied.push(ENV_AUTO_PRESSURE_RESPONSE);
        }

        Ok(applied)
    }

    /// `MEMTIDE_CONFIG`, else `$XDG_CONFIG_HOME/memtide/memory.json`
    fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
            return Some(PathBuf::from(path));
        }

        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config_home) => PathBuf::from(xdg_config_home),
            Err(_) => dirs::config_dir()?,
        };

        Some(config_dir.join("memtide").join("memory.json"))
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| Error::Configuration {
            message: format!("Invalid value for {name}: '{raw}'"),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }),
        Err(_) => Ok(None),
    }
}
