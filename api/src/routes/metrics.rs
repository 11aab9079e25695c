//! Prometheus scrape endpoint.

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shared::metrics::Registry;

/// Error response.
#[derive(Debug, Serialize)]
pub struct MetricsErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(scrape_metrics))
        .with_state(state)
}

/// Serializes the registry in the text exposition format.
///
/// Answers 500 only when the registry was never initialized.
async fn scrape_metrics(State(state): State<AppState>) -> Response {
    match state.registry().serialize() {
        Ok(body) => ([(header::CONTENT_TYPE, Registry::content_type())], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MetricsErrorResponse {
                    error: "metrics_unavailable".to_string(),
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
