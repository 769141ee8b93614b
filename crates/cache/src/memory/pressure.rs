//! Memory pressure classification

use crate::errors::{CacheError, RecoveryHint, Result};
use serde::{Deserialize, Serialize};

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPressure {
    /// Plenty of memory available
    Low,
    /// Memory usage is moderate
    Medium,
    /// Memory usage is high, start cleaning up
    High,
    /// Critical memory shortage
    Critical,
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Usage fractions at which each pressure level starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            medium: 0.60,
            high: 0.80,
            critical: 0.95,
        }
    }
}

impl PressureThresholds {
    /// Thresholds must lie in (0, 1) and be strictly ascending
    pub fn validate(&self) -> Result<()> {
        let in_range = |value: f64| value > 0.0 && value < 1.0;

        if !(in_range(self.medium) && in_range(self.high) && in_range(self.critical)) {
            return Err(CacheError::Configuration {
                message: format!(
                    "Pressure thresholds must be fractions in (0, 1), got medium={}, high={}, critical={}",
                    self.medium, self.high, self.critical
                ),
                recovery_hint: RecoveryHint::UpdateConfiguration,
            });
        }

        if !(self.medium < self.high && self.high < self.critical) {
            return Err(CacheError::Configuration {
                message: format!(
                    "Pressure thresholds must be strictly ascending, got medium={}, high={}, critical={}",
                    self.medium, self.high, self.critical
                ),
                recovery_hint: RecoveryHint::UpdateConfiguration,
            });
        }

        Ok(())
    }

    /// Map a usage fraction to a pressure level
    pub fn classify(&self, usage: f64) -> MemoryPressure {
        if usage >= self.critical {
            MemoryPressure::Critical
        } else if usage >= self.high {
            MemoryPressure::High
        } else if usage >= self.medium {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}
