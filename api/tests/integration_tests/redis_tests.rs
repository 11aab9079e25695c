//! Integration tests for the Redis probe endpoint.
//!
//! Tests cover:
//! - Healthy and refused dependencies
//! - The probe timeout bound
//! - Repeated probes reflecting the current dependency state

use axum::http::StatusCode;
use serde_json::json;
use shared::config::RedisConfig;
use shared::health::{RedisClient, DEFAULT_PROBE_TIMEOUT};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::common::{closed_port, get, get_text, test_app, test_app_with, StalledRedis};

#[tokio::test]
async fn test_redis_up_returns_healthy() {
    let (app, _state) = test_app(true);

    let (status, response) = get(app, "/redis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"status": true, "message": "Redis connection is healthy"})
    );
}

#[tokio::test]
async fn test_redis_closed_port_returns_refused() {
    let client = RedisClient::new(&RedisConfig::new("127.0.0.1", closed_port())).unwrap();
    let (app, _state) = test_app_with(Arc::new(client), DEFAULT_PROBE_TIMEOUT);

    let started = Instant::now();
    let (status, response) = get(app, "/redis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"status": false, "message": "Redis connection failed: connection refused"})
    );
    assert!(started.elapsed() < DEFAULT_PROBE_TIMEOUT);
}

#[tokio::test]
async fn test_redis_response_is_json() {
    let (app, _state) = test_app(false);

    let (status, content_type, _) = get_text(app, "/redis").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.is_some_and(|ct| ct.contains("application/json")));
}

#[tokio::test]
async fn test_stalled_redis_times_out_within_bound() {
    let timeout = Duration::from_millis(100);
    let (app, _state) = test_app_with(Arc::new(StalledRedis), timeout);

    let started = Instant::now();
    let (status, response) = get(app, "/redis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], false);
    assert_eq!(
        response["message"],
        "Redis connection failed: timed out after 100ms"
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_repeated_probes_are_independent() {
    let client = Arc::new(RedisClient::new(&RedisConfig::new("127.0.0.1", closed_port())).unwrap());
    let (app, _state) = test_app_with(client, DEFAULT_PROBE_TIMEOUT);

    let (_, first) = get(app.clone(), "/redis").await;
    let (_, second) = get(app, "/redis").await;
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore = "requires a running Redis on REDIS_HOST:REDIS_PORT"]
async fn test_live_redis_returns_healthy() {
    let client = RedisClient::new(&RedisConfig::from_env().unwrap()).unwrap();
    let (app, _state) = test_app_with(Arc::new(client), DEFAULT_PROBE_TIMEOUT);

    let (status, response) = get(app, "/redis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"status": true, "message": "Redis connection is healthy"})
    );
}
