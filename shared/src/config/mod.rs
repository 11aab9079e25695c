//! Configuration module for Depwatch.
//!
//! This module contains the dependency connection settings, metric collection
//! settings and the helpers used to read typed values out of the environment.

pub mod env;
pub mod metrics;
pub mod redis;

pub use env::ConfigError;
pub use metrics::MetricsConfig;
pub use self::redis::RedisConfig;
