//! Scheduler Configuration
//!
//! Tunables for the cooperative work loop. The defaults match the usual idle
//! callback contract: keep working while at least a millisecond of idle time
//! remains.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration for a [`Root`](crate::scheduler::Root)'s work loop.
///
/// # Example
///
/// ```rust
/// use arbor_core::SchedulerConfig;
///
/// let config = SchedulerConfig::from_json(r#"{ "yield_threshold_ms": 2.5 }"#).unwrap();
/// assert_eq!(config.yield_threshold_ms, 2.5);
/// assert_eq!(config.max_units_per_slice, None);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Yield once the deadline reports less than this much time remaining.
    pub yield_threshold_ms: f64,

    /// Optional hard cap on units of work processed per work loop call.
    pub max_units_per_slice: Option<usize>,
}

impl SchedulerConfig {
    /// Parse a configuration from a JSON document. Missing fields take their
    /// default values.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Duration::try_from_secs_f64(self.yield_threshold_ms / 1000.0).is_err() {
            return Err(ConfigError::Invalid {
                field: "yield_threshold_ms",
                reason: format!(
                    "expected a non-negative number of milliseconds that fits a Duration, got {}",
                    self.yield_threshold_ms
                ),
            });
        }
        if self.max_units_per_slice == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_units_per_slice",
                reason: "a slice must allow at least one unit of work".to_string(),
            });
        }
        Ok(())
    }

    /// The yield threshold as a [`Duration`].
    ///
    /// Saturates for values [`validate`](Self::validate) would reject: NaN and
    /// negative thresholds never yield, oversized ones yield after every unit.
    pub fn yield_threshold(&self) -> Duration {
        let secs = self.yield_threshold_ms / 1000.0;
        match Duration::try_from_secs_f64(secs) {
            Ok(threshold) => threshold,
            Err(_) if secs > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            yield_threshold_ms: 1.0,
            max_units_per_slice: None,
        }
    }
}
