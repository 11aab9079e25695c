//! Redis implementation of [`KeyValueClient`].

use super::client::KeyValueClient;
use super::result::ProbeFailure;
use crate::config::{ConfigError, RedisConfig};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{ErrorKind, RedisError};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Redis client holding one lazily opened multiplexed connection.
///
/// The connection is cloned for every ping, so concurrent probes share one
/// socket. After a failed round-trip or a [`reset`](KeyValueClient::reset)
/// it is dropped and the next ping dials again.
pub struct RedisClient {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    stale: AtomicBool,
    target: String,
}

impl RedisClient {
    /// Creates a client from configuration. No connection is opened yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection URL is malformed.
    pub fn new(config: &RedisConfig) -> Result<Self, ConfigError> {
        let target = config.redacted_target();
        let source = if config.url.is_some() {
            "REDIS_URL"
        } else {
            "REDIS_HOST"
        };
        let client = redis::Client::open(config.connection_url())
            .map_err(|e| ConfigError::invalid(source, &target, e.to_string()))?;

        Ok(Self {
            client,
            connection: Mutex::new(None),
            stale: AtomicBool::new(false),
            target,
        })
    }

    /// Log-safe description of the Redis target.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    // The guard is held across the dial so concurrent first pings share one
    // connection.
    async fn connection(&self) -> Result<MultiplexedConnection, RedisError> {
        let mut cached = self.connection.lock().await;
        if self.stale.swap(false, Ordering::SeqCst) && cached.take().is_some() {
            tracing::debug!(redis = %self.target, "Dropped stalled Redis connection");
        }
        if let Some(conn) = cached.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        tracing::debug!(redis = %self.target, "Opened Redis connection");
        *cached = Some(conn.clone());
        Ok(conn)
    }

    async fn discard_connection(&self) {
        self.connection.lock().await.take();
    }
}

#[async_trait]
impl KeyValueClient for RedisClient {
    fn name(&self) -> &str {
        "Redis"
    }

    async fn ping(&self) -> Result<(), ProbeFailure> {
        let mut conn = self.connection().await.map_err(|e| classify(&e))?;

        let reply: String = match redis::cmd("PING").query_async(&mut conn).await {
            Ok(reply) => reply,
            Err(e) => {
                self.discard_connection().await;
                return Err(classify(&e));
            }
        };

        if reply == "PONG" {
            Ok(())
        } else {
            Err(ProbeFailure::UnexpectedReply(reply))
        }
    }

    fn reset(&self) {
        self.stale.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Maps a Redis error onto the probe failure taxonomy.
fn classify(err: &RedisError) -> ProbeFailure {
    if err.is_connection_refusal() {
        return ProbeFailure::ConnectionRefused;
    }
    if err.kind() == ErrorKind::AuthenticationFailed
        || matches!(err.code(), Some("NOAUTH" | "WRONGPASS"))
    {
        return ProbeFailure::Authentication(err.to_string());
    }
    ProbeFailure::Other(err.to_string())
}
