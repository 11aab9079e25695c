//! Typed environment variable access.
//!
//! Every reader treats an unset variable as "use the default" and a set but
//! malformed variable as a [`ConfigError`], so misconfiguration surfaces at
//! startup instead of at request time.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but its value could not be parsed.
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        /// Name of the environment variable.
        var: String,
        /// The raw value that failed to parse.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required value was empty.
    #[error("{0} must not be empty")]
    Empty(String),
}

impl ConfigError {
    /// Builds an [`ConfigError::InvalidValue`] for `var`.
    pub fn invalid(var: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Returns the value of `var`, or `None` when it is unset.
#[must_use]
pub fn var(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Returns the value of `var`, or `default` when it is unset.
#[must_use]
pub fn string_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Parses `var` with [`FromStr`], falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the variable is set but does not parse.
pub fn parse_or<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

/// Parses a raw value on behalf of `var`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `raw` does not parse as `T`.
pub fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid(var, raw, e.to_string()))
}

/// Reads a boolean toggle. Accepts `true/false`, `1/0`, `yes/no` and `on/off`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for any other value.
pub fn bool_or(var: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => parse_bool(var, &raw),
        Err(_) => Ok(default),
    }
}

/// Parses a boolean toggle value on behalf of `var`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `raw` is not a recognised toggle.
pub fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(var, raw, "expected a boolean")),
    }
}

/// Reads a strictly positive millisecond duration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the value is not an integer or is zero.
pub fn millis_or(var: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => parse_millis(var, &raw),
        Err(_) => Ok(default),
    }
}

/// Parses a strictly positive millisecond duration on behalf of `var`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `raw` is not a positive integer.
pub fn parse_millis(var: &str, raw: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = parse_value(var, raw)?;
    if ms == 0 {
        return Err(ConfigError::invalid(var, raw, "must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}
