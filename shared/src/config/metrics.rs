//! Metrics collection settings.

use super::env::{self, ConfigError};
use std::time::Duration;

/// Default interval between event-loop lag samples.
pub const DEFAULT_LAG_INTERVAL: Duration = Duration::from_millis(500);

/// Settings consumed by [`crate::metrics::Registry::initialize`].
///
/// Configuration values can be set via environment variables:
/// - `DEPWATCH_COLLECT_DEFAULT_METRICS`: Register process/runtime metrics (default: true)
/// - `DEPWATCH_METRICS_PREFIX`: Namespace for application metrics (default: none)
/// - `DEPWATCH_LAG_INTERVAL_MS`: Event-loop lag sampling interval (default: 500)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether built-in process and runtime metrics are registered.
    pub collect_default_metrics: bool,
    /// Namespace prepended to application metric names.
    pub prefix: Option<String>,
    /// How often the event-loop lag monitor samples.
    pub lag_interval: Duration,
}

impl MetricsConfig {
    /// Loads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a toggle or interval is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            collect_default_metrics: env::bool_or("DEPWATCH_COLLECT_DEFAULT_METRICS", true)?,
            prefix: env::var("DEPWATCH_METRICS_PREFIX").filter(|p| !p.trim().is_empty()),
            lag_interval: env::millis_or("DEPWATCH_LAG_INTERVAL_MS", DEFAULT_LAG_INTERVAL)?,
        })
    }

    /// Returns a configuration with built-in metrics disabled.
    #[must_use]
    pub fn without_default_metrics() -> Self {
        Self {
            collect_default_metrics: false,
            ..Self::default()
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            collect_default_metrics: true,
            prefix: None,
            lag_interval: DEFAULT_LAG_INTERVAL,
        }
    }
}
