//! Redis connection settings.

use super::env::{self, ConfigError};

/// Default Redis host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default Redis port.
pub const DEFAULT_PORT: u16 = 6379;

/// Connection parameters for the Redis dependency.
///
/// Configuration values can be set via environment variables:
/// - `REDIS_URL`: Full connection URL; when set, the other variables are ignored
/// - `REDIS_HOST`: Host name or address (default: "127.0.0.1")
/// - `REDIS_PORT`: Port (default: 6379)
/// - `REDIS_PASSWORD`: Password sent with `AUTH` (default: none)
#[derive(Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Explicit connection URL, overriding host/port/password.
    pub url: Option<String>,
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Optional password.
    pub password: Option<String>,
}

impl RedisConfig {
    /// Creates a configuration for `host:port` without credentials.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            url: None,
            host: host.into(),
            port,
            password: None,
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Loads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `REDIS_PORT` is set but is not a valid port number
    /// - `REDIS_HOST` or `REDIS_URL` is set to an empty string
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("REDIS_URL");
        if url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(ConfigError::Empty("REDIS_URL".to_string()));
        }

        let host = env::string_or("REDIS_HOST", DEFAULT_HOST);
        if host.trim().is_empty() {
            return Err(ConfigError::Empty("REDIS_HOST".to_string()));
        }

        let port = env::parse_or("REDIS_PORT", DEFAULT_PORT)?;
        let password = env::var("REDIS_PASSWORD").filter(|p| !p.is_empty());

        Ok(Self {
            url,
            host,
            port,
            password,
        })
    }

    /// Returns the URL handed to the Redis client.
    #[must_use]
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let auth = self
            .password
            .as_ref()
            .map(|p| format!(":{}@", urlencoding::encode(p)))
            .unwrap_or_default();

        format!("redis://{auth}{}:{}/", self.host_for_url(), self.port)
    }

    /// Returns a log-safe description of the target with credentials removed.
    #[must_use]
    pub fn redacted_target(&self) -> String {
        match &self.url {
            Some(url) => redact_url(url),
            None => format!("{}:{}", self.host_for_url(), self.port),
        }
    }

    fn host_for_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("url", &self.url.as_deref().map(redact_url))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Replaces the userinfo part of a URL with `***`.
fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    match url[scheme_end..].rfind('@') {
        Some(at) => format!("{}***{}", &url[..scheme_end], &url[scheme_end + at..]),
        None => url.to_string(),
    }
}
