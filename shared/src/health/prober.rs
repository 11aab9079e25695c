//! Dependency health prober.

use super::client::KeyValueClient;
use super::result::{HealthResult, ProbeFailure};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Answers whether a dependency is currently reachable.
///
/// Every call to [`HealthProber::check_health`] performs a fresh ping; nothing
/// about a previous outcome is remembered.
#[derive(Clone)]
pub struct HealthProber {
    client: Arc<dyn KeyValueClient>,
    timeout: Duration,
}

impl HealthProber {
    /// Creates a prober for `client` bounded by `timeout`.
    #[must_use]
    pub fn new(client: Arc<dyn KeyValueClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Name of the probed dependency.
    #[must_use]
    pub fn dependency(&self) -> &str {
        self.client.name()
    }

    /// The configured bound on a single probe.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pings the dependency once and reports the outcome.
    ///
    /// Never fails: refusals, timeouts, protocol errors and even a panicking
    /// client are all reported as `status: false`. On timeout the in-flight
    /// ping is cancelled.
    pub async fn check_health(&self) -> HealthResult {
        let started = Instant::now();
        let dependency = self.client.name();

        match self.ping_bounded().await {
            Ok(()) => {
                tracing::debug!(
                    dependency,
                    elapsed_ms = elapsed_ms(started),
                    "Dependency probe succeeded"
                );
                HealthResult::healthy(dependency)
            }
            Err(reason) => {
                tracing::warn!(
                    dependency,
                    elapsed_ms = elapsed_ms(started),
                    reason = %reason,
                    "Dependency probe failed"
                );
                HealthResult::failed(dependency, &reason)
            }
        }
    }

    async fn ping_bounded(&self) -> Result<(), ProbeFailure> {
        let client = Arc::clone(&self.client);
        let mut task = tokio::spawn(async move { client.ping().await });

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(ProbeFailure::Other(format!(
                "probe task failed: {join_error}"
            ))),
            Err(_) => {
                task.abort();
                self.client.reset();
                Err(ProbeFailure::Timeout(self.timeout))
            }
        }
    }
}

impl std::fmt::Debug for HealthProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthProber")
            .field("dependency", &self.client.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
