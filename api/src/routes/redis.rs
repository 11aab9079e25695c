//! Redis dependency health endpoint.
//!
//! Always answers 200; the dependency state is carried in the JSON body.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use shared::health::HealthResult;

/// Creates the Redis health routes.
pub fn redis_routes(state: AppState) -> Router {
    Router::new()
        .route("/redis", get(check_redis))
        .with_state(state)
}

async fn check_redis(State(state): State<AppState>) -> Json<HealthResult> {
    Json(state.prober().check_health().await)
}
