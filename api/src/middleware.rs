//! Request metrics middleware.
//!
//! Records a counter and a latency histogram for every request that matched a route.

use crate::state::AppState;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::metrics::{MetricsError, Registry};
use shared::prometheus::{self, CounterVec, HistogramVec};
use std::time::Instant;

/// Handles to the HTTP request metrics.
#[derive(Clone)]
pub struct HttpMetrics {
    requests: CounterVec,
    duration: HistogramVec,
}

impl HttpMetrics {
    /// Registers (or reuses) the request metrics in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is already registered with another kind.
    pub fn register(registry: &Registry) -> Result<Self, MetricsError> {
        Ok(Self {
            requests: registry.counter(
                "http_requests_total",
                "Total HTTP requests by route and status.",
                &["method", "path", "status"],
            )?,
            duration: registry.histogram(
                "http_request_duration_seconds",
                "HTTP request latency in seconds.",
                &["method", "path"],
                prometheus::DEFAULT_BUCKETS,
            )?,
        })
    }

    /// Records one completed request.
    pub fn observe(&self, method: &str, path: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        self.requests
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.duration
            .with_label_values(&[method, path])
            .observe(seconds);
    }
}

/// Middleware recording [`HttpMetrics`] for matched routes.
///
/// Install with `route_layer` so only matched requests are labelled.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_owned(), |p| p.as_str().to_owned());

    let response = next.run(request).await;

    state.http_metrics().observe(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}
