//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup, fake dependency clients and HTTP request helpers.

use api::{create_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::config::MetricsConfig;
use shared::health::{HealthProber, KeyValueClient, ProbeFailure, DEFAULT_PROBE_TIMEOUT};
use shared::metrics::Registry;
use std::sync::Arc;
use std::time::Duration;

/// Fake Redis client with a fixed answer.
pub struct FakeRedis {
    pub up: bool,
}

#[async_trait]
impl KeyValueClient for FakeRedis {
    fn name(&self) -> &str {
        "Redis"
    }

    async fn ping(&self) -> Result<(), ProbeFailure> {
        if self.up {
            Ok(())
        } else {
            Err(ProbeFailure::ConnectionRefused)
        }
    }
}

/// Fake Redis client that never answers.
pub struct StalledRedis;

#[async_trait]
impl KeyValueClient for StalledRedis {
    fn name(&self) -> &str {
        "Redis"
    }

    async fn ping(&self) -> Result<(), ProbeFailure> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Creates a test router around `client` with an initialized registry.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app_with(client: Arc<dyn KeyValueClient>, timeout: Duration) -> (Router, AppState) {
    let registry = Registry::new();
    registry
        .initialize(&MetricsConfig::without_default_metrics())
        .unwrap();

    let prober = HealthProber::new(client, timeout);
    let state = AppState::new(Arc::new(registry), prober).unwrap();
    let router = create_router(state.clone());
    (router, state)
}

/// Creates a test router whose fake Redis is up or down.
pub fn test_app(redis_up: bool) -> (Router, AppState) {
    test_app_with(Arc::new(FakeRedis { up: redis_up }), DEFAULT_PROBE_TIMEOUT)
}

/// Helper to make a GET request and parse a JSON body.
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get_text(app, uri).await;
    let json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Helper to make a GET request and keep the body as text.
///
/// # Returns
///
/// A tuple containing the status code, the content type and the body.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(body_bytes.to_vec()).unwrap();

    (status, content_type, body)
}

/// Returns a local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Asserts that `text` parses as Prometheus text exposition format.
///
/// Returns the sample lines as `(series, value)` pairs.
pub fn parse_exposition(text: &str) -> Vec<(String, f64)> {
    let mut samples = Vec::new();

    for line in text.lines().filter(|l| !l.is_empty()) {
        if let Some(comment) = line.strip_prefix("# ") {
            let mut parts = comment.splitn(3, ' ');
            let keyword = parts.next().unwrap();
            let name = parts.next().unwrap_or_default();
            assert!(valid_metric_name(name), "bad name in comment: {line}");
            match keyword {
                "HELP" => {}
                "TYPE" => {
                    let kind = parts.next().unwrap_or_default();
                    assert!(
                        ["counter", "gauge", "histogram", "summary", "untyped"].contains(&kind),
                        "bad TYPE line: {line}"
                    );
                }
                _ => panic!("unexpected comment: {line}"),
            }
            continue;
        }

        let (series, value) = line
            .rsplit_once(' ')
            .unwrap_or_else(|| panic!("sample without value: {line}"));
        let value: f64 = value
            .parse()
            .unwrap_or_else(|_| panic!("non-numeric value: {line}"));

        let name = series.split('{').next().unwrap();
        assert!(valid_metric_name(name), "bad metric name: {line}");
        if series.contains('{') {
            assert!(series.ends_with('}'), "unterminated labels: {line}");
        }

        samples.push((series.to_string(), value));
    }

    samples
}

fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
