//! Depwatch Shared Library
//!
//! This crate contains the two pieces of Depwatch with real behavior: the
//! metrics registry and the dependency health prober.
//!
//! # Modules
//!
//! - [`metrics`] - Registry lifecycle, built-in process/runtime collectors
//! - [`health`] - Key-value store probe and its outcome types
//! - [`config`] - Environment-driven settings
//!
//! # Example
//!
//! ```
//! use shared::config::MetricsConfig;
//! use shared::metrics::Registry;
//!
//! let registry = Registry::new();
//! registry.initialize(&MetricsConfig::without_default_metrics()).unwrap();
//! assert!(registry.serialize().is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod health;
pub mod metrics;

/// Re-export common dependencies for convenience.
pub use prometheus;
pub use serde;
pub use serde_json;
