//! Dependency health probing.
//!
//! The [`HealthProber`] depends only on the [`KeyValueClient`] capability;
//! [`RedisClient`] is the production implementation.

pub mod client;
pub mod prober;
pub mod redis;
pub mod result;

pub use client::KeyValueClient;
pub use prober::{HealthProber, DEFAULT_PROBE_TIMEOUT};
pub use self::redis::RedisClient;
pub use result::{HealthResult, ProbeFailure};
