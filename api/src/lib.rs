//! Depwatch API Server
//!
//! This crate provides the HTTP server that exposes the process metrics
//! registry and the Redis dependency probe.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - `GET /metrics` - Prometheus text exposition of every registered metric
//! - `GET /redis` - JSON health of the Redis dependency, always 200
//! - `GET /health` - process liveness
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod middleware;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

pub use config::Config;
pub use middleware::HttpMetrics;
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use shared::config::MetricsConfig;
use shared::health::{HealthProber, RedisClient};
use shared::metrics::{EventLoopLagMonitor, Registry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Runs the Depwatch API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The metrics registry cannot be initialized
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Depwatch API server with the provided configuration.
///
/// The metrics registry is initialized before the listener is bound, so no
/// request can observe an uninitialized registry.
///
/// # Errors
///
/// Returns an error if:
/// - The metrics registry cannot be initialized
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        redis = %config.redis.redacted_target(),
        probe_timeout_ms = u64::try_from(config.probe_timeout.as_millis()).unwrap_or(u64::MAX),
        "Depwatch API server starting"
    );

    let state = build_state(&config)?;
    let lag_monitor = start_lag_monitor(&state, &config.metrics)?;

    let app = create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "Listening for connections");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = lag_monitor {
        handle.abort();
    }
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Builds and initializes the application state from configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Process metrics are unavailable or a built-in metric name conflicts
/// - The Redis connection URL is malformed
pub fn build_state(config: &Config) -> Result<AppState> {
    let registry = match &config.metrics.prefix {
        Some(prefix) => Registry::with_prefix(prefix.clone()),
        None => Registry::new(),
    };
    registry
        .initialize(&config.metrics)
        .context("Failed to initialize metrics registry")?;

    let client = RedisClient::new(&config.redis).context("Invalid Redis configuration")?;
    let prober = HealthProber::new(Arc::new(client), config.probe_timeout);

    AppState::new(Arc::new(registry), prober).context("Failed to register HTTP metrics")
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::metrics_routes(state.clone()))
        .merge(routes::redis_routes(state.clone()))
        .merge(routes::health_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
}

fn start_lag_monitor(state: &AppState, config: &MetricsConfig) -> Result<Option<JoinHandle<()>>> {
    if !config.collect_default_metrics {
        return Ok(None);
    }
    let gauge = state.registry().event_loop_lag()?;
    Ok(Some(
        EventLoopLagMonitor::new(gauge, config.lag_interval).spawn(),
    ))
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
