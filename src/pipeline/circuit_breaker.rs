//! Circuit Breaker for snapshot writes.
//!
//! Keeps a failed or truncated page from wiping out the stored snapshot.
//! An empty extraction never replaces a non-empty snapshot unless
//! explicitly allowed, and a drop in total spot count above the configured
//! threshold aborts the write.

use crate::error::{AppError, Result};
use crate::models::{GuardConfig, Snapshot};

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Maximum allowed drop percentage (0-100). Default: 100 (disabled)
    pub max_drop_percent: u8,
    /// Minimum previous spot count to run the drop check.
    pub min_baseline: usize,
    /// Allow an empty snapshot to replace a non-empty one
    pub allow_empty_overwrite: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from(&GuardConfig::default())
    }
}

impl From<&GuardConfig> for CircuitBreakerConfig {
    fn from(guard: &GuardConfig) -> Self {
        Self {
            max_drop_percent: guard.max_drop_percent,
            min_baseline: guard.min_baseline,
            allow_empty_overwrite: guard.allow_empty_overwrite,
        }
    }
}

/// Circuit breaker for preventing bad snapshot updates.
#[derive(Debug, Clone, Default)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
}

/// Result of circuit breaker check.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitBreakerResult {
    /// Safe to proceed with the write
    Safe {
        current_count: usize,
        previous_count: usize,
    },
    /// No previous data, or previous below baseline
    ColdStart { current_count: usize },
    /// Circuit breaker triggered - abort write
    Triggered {
        current_count: usize,
        previous_count: usize,
        drop_percent: f64,
    },
    /// Empty result replacing non-empty data
    EmptyResult { previous_count: usize },
}

impl CircuitBreaker {
    /// Create a new circuit breaker with custom configuration.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self { config }
    }

    /// Same breaker with empty overwrites permitted (`--force`).
    pub fn forced(mut self) -> Self {
        self.config.allow_empty_overwrite = true;
        self.config.max_drop_percent = 100;
        self
    }

    /// Check if it's safe to replace `previous` with `current`.
    pub fn check(&self, current: &Snapshot, previous: &Snapshot) -> CircuitBreakerResult {
        let current_count = current.spot_count();
        let previous_count = previous.spot_count();

        // Case 1: Empty current result
        if current_count == 0 {
            if previous_count == 0 || self.config.allow_empty_overwrite {
                return CircuitBreakerResult::ColdStart { current_count };
            }
            return CircuitBreakerResult::EmptyResult { previous_count };
        }

        // Case 2: Cold start (no previous data or below baseline)
        if previous_count == 0 || previous_count < self.config.min_baseline {
            return CircuitBreakerResult::ColdStart { current_count };
        }

        // Case 3: Check drop percentage
        if current_count < previous_count {
            let drop = previous_count - current_count;
            let drop_percent = (drop as f64 / previous_count as f64) * 100.0;

            if drop_percent > self.config.max_drop_percent as f64 {
                return CircuitBreakerResult::Triggered {
                    current_count,
                    previous_count,
                    drop_percent,
                };
            }
        }

        CircuitBreakerResult::Safe {
            current_count,
            previous_count,
        }
    }

    /// Validate and return Ok if safe, Err if circuit breaker triggered.
    pub fn validate(&self, current: &Snapshot, previous: &Snapshot) -> Result<()> {
        match self.check(current, previous) {
            CircuitBreakerResult::Safe {
                current_count,
                previous_count,
            } => {
                log::debug!(
                    "Circuit breaker: SAFE ({} spots, was {})",
                    current_count,
                    previous_count
                );
                Ok(())
            }
            CircuitBreakerResult::ColdStart { current_count } => {
                log::debug!(
                    "Circuit breaker: COLD START ({} spots, no usable baseline)",
                    current_count
                );
                Ok(())
            }
            CircuitBreakerResult::Triggered {
                current_count,
                previous_count,
                drop_percent,
            } => {
                log::error!(
                    "Circuit breaker: TRIGGERED! {} → {} spots ({:.1}% drop > {}% threshold)",
                    previous_count,
                    current_count,
                    drop_percent,
                    self.config.max_drop_percent
                );
                Err(AppError::CircuitBreakerTriggered {
                    current_count,
                    previous_count,
                    drop_percent,
                    threshold_percent: self.config.max_drop_percent,
                })
            }
            CircuitBreakerResult::EmptyResult { previous_count } => {
                log::error!(
                    "Circuit breaker: EMPTY RESULT would replace {} stored spots - aborting write",
                    previous_count
                );
                Err(AppError::EmptyExtraction)
            }
        }
    }
}
