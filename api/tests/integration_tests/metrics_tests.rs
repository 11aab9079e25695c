//! Integration tests for the scrape endpoint.
//!
//! Tests cover:
//! - Content type and exposition format
//! - Built-in process metrics on a freshly started server
//! - Concurrent scrapes while metrics are being updated, with and without
//!   the process collectors

use api::AppState;
use axum::http::StatusCode;
use axum::Router;

use super::common::{get_text, parse_exposition, test_app};

#[tokio::test]
async fn test_metrics_content_type_and_format() {
    let (app, state) = test_app(true);
    state.http_metrics().observe("GET", "/redis", 200, 0.002);

    let (status, content_type, body) = get_text(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; version=0.0.4"));

    let samples = parse_exposition(&body);
    assert!(samples
        .iter()
        .any(|(series, value)| series.starts_with("http_requests_total{") && *value == 1.0));
}

#[tokio::test]
async fn test_application_metric_registered_after_start_is_scraped() {
    let (app, state) = test_app(true);

    let jobs = state
        .registry()
        .gauge("queue_depth", "Jobs waiting", &["queue"])
        .unwrap();
    jobs.with_label_values(&["email"]).set(7.0);

    let (_, _, body) = get_text(app, "/metrics").await;
    assert!(body.contains("# TYPE queue_depth gauge"));
    assert!(body.contains("queue_depth{queue=\"email\"} 7"));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_fresh_server_exposes_process_metrics() {
    let state = api::build_state(&api::Config::default()).unwrap();
    let app = api::create_router(state);

    let (status, _, body) = get_text(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let samples = parse_exposition(&body);
    for name in [
        "process_cpu_seconds_total",
        "process_resident_memory_bytes",
        "process_start_time_seconds",
    ] {
        let value = samples
            .iter()
            .find(|(series, _)| series == name)
            .map(|(_, v)| *v)
            .unwrap_or_else(|| panic!("{name} missing from scrape"));
        assert!(value >= 0.0, "{name} = {value}");
    }
    assert!(samples.iter().any(|(s, _)| s == "process_uptime_seconds"));
    assert!(samples.iter().any(|(s, _)| s == "tokio_runtime_workers"));
}

/// Fires 100 scrapes while four writers update metrics, asserting each
/// response is a well-formed exposition.
async fn assert_concurrent_scrapes_well_formed(app: Router, state: AppState) {
    let load = state
        .registry()
        .counter("synthetic_load_total", "Synthetic updates", &["worker"])
        .unwrap();

    let mut writers = tokio::task::JoinSet::new();
    for worker in 0..4 {
        let load = load.clone();
        let state = state.clone();
        writers.spawn(async move {
            let worker = worker.to_string();
            for i in 0..500u32 {
                load.with_label_values(&[worker.as_str()]).inc();
                state
                    .http_metrics()
                    .observe("GET", "/synthetic", 200, f64::from(i) / 1000.0);
                tokio::task::yield_now().await;
            }
        });
    }

    let mut scrapes = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let app = app.clone();
        scrapes.spawn(async move { get_text(app, "/metrics").await });
    }

    let mut completed = 0;
    while let Some(result) = scrapes.join_next().await {
        let (status, _, body) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        parse_exposition(&body);
        completed += 1;
    }
    assert_eq!(completed, 100);

    while let Some(result) = writers.join_next().await {
        result.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scrapes_are_well_formed() {
    let (app, state) = test_app(true);
    assert_concurrent_scrapes_well_formed(app, state).await;
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scrapes_with_process_collectors() {
    let state = api::build_state(&api::Config::default()).unwrap();
    let app = api::create_router(state.clone());

    assert_concurrent_scrapes_well_formed(app.clone(), state).await;

    let (_, _, body) = get_text(app, "/metrics").await;
    let samples = parse_exposition(&body);
    assert!(samples
        .iter()
        .any(|(series, _)| series == "process_resident_memory_bytes"));
    assert!(samples
        .iter()
        .any(|(series, _)| series == "tokio_runtime_alive_tasks"));
}
