//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::{env, MetricsConfig, RedisConfig};
use shared::health::DEFAULT_PROBE_TIMEOUT;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `DEPWATCH_HOST`: The IP address to bind to (default: "0.0.0.0")
/// - `DEPWATCH_PORT`: The port to listen on (default: 3000)
/// - `DEPWATCH_PROBE_TIMEOUT_MS`: Bound on a single Redis probe (default: 2000)
///
/// Redis and metrics settings are read by [`RedisConfig::from_env`] and
/// [`MetricsConfig::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Timeout applied to every dependency probe.
    pub probe_timeout: Duration,
    /// Redis connection settings.
    pub redis: RedisConfig,
    /// Metrics collection settings.
    pub metrics: MetricsConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DEPWATCH_HOST` is not an IP address
    /// - `DEPWATCH_PORT` is set but cannot be parsed as a valid port number
    /// - `DEPWATCH_PROBE_TIMEOUT_MS` is zero or not a number
    /// - any Redis or metrics variable is malformed
    pub fn from_env() -> Result<Self> {
        let host = env::string_or("DEPWATCH_HOST", "0.0.0.0");
        let port = env::parse_or("DEPWATCH_PORT", DEFAULT_PORT)?;
        let probe_timeout = env::millis_or("DEPWATCH_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT)?;

        let config = Self {
            host,
            port,
            probe_timeout,
            redis: RedisConfig::from_env().context("Invalid Redis configuration")?,
            metrics: MetricsConfig::from_env().context("Invalid metrics configuration")?,
        };
        config.socket_addr()?;

        Ok(config)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("DEPWATCH_HOST must be an IP address, got '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            redis: RedisConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}
