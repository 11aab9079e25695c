//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::middleware::HttpMetrics;
use shared::health::HealthProber;
use shared::metrics::{MetricsError, Registry};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Cloning is cheap; all clones share the same registry and prober.
#[derive(Clone)]
pub struct AppState {
    /// The metrics registry served on `/metrics`.
    registry: Arc<Registry>,
    /// The Redis prober served on `/redis`.
    prober: HealthProber,
    /// Request metrics recorded by the middleware.
    http_metrics: HttpMetrics,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// Registers the HTTP request metrics in `registry`. The registry may or may
    /// not be initialized yet; `/metrics` answers 500 until it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the request metric names conflict with existing registrations.
    pub fn new(registry: Arc<Registry>, prober: HealthProber) -> Result<Self, MetricsError> {
        let http_metrics = HttpMetrics::register(&registry)?;
        Ok(Self {
            registry,
            prober,
            http_metrics,
        })
    }

    /// Returns a reference to the metrics registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.registry.as_ref()
    }

    /// Returns a reference to the dependency prober.
    #[must_use]
    pub fn prober(&self) -> &HealthProber {
        &self.prober
    }

    /// Returns the request metrics.
    #[must_use]
    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.http_metrics
    }
}
