//! Probe outcome types.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Reason a dependency ping failed.
///
/// The `Display` text is what ends up after `connection failed: ` in the
/// health message, so it stays short and lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// Nothing is listening at the target address.
    #[error("connection refused")]
    ConnectionRefused,

    /// The round-trip did not complete within the probe's bound.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The dependency rejected our credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The dependency answered, but not with the expected reply.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// Any other transport or protocol failure.
    #[error("{0}")]
    Other(String),
}

/// Result of a single health probe.
///
/// Serialized as `{"status": bool, "message": string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResult {
    /// Whether the dependency answered the probe.
    pub status: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl HealthResult {
    /// Builds the result for a successful probe of `dependency`.
    ///
    /// ```
    /// use shared::health::HealthResult;
    ///
    /// let result = HealthResult::healthy("Redis");
    /// assert!(result.status);
    /// assert_eq!(result.message, "Redis connection is healthy");
    /// ```
    #[must_use]
    pub fn healthy(dependency: &str) -> Self {
        Self {
            status: true,
            message: format!("{dependency} connection is healthy"),
        }
    }

    /// Builds the result for a failed probe of `dependency`.
    #[must_use]
    pub fn failed(dependency: &str, reason: &ProbeFailure) -> Self {
        Self {
            status: false,
            message: format!("{dependency} connection failed: {reason}"),
        }
    }
}
