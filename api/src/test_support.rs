//! Fixtures shared by the unit tests in this crate.

use crate::state::AppState;
use async_trait::async_trait;
use shared::config::MetricsConfig;
use shared::health::{HealthProber, KeyValueClient, ProbeFailure, DEFAULT_PROBE_TIMEOUT};
use shared::metrics::Registry;
use std::sync::Arc;

/// Client answering every ping the same way.
pub struct StaticClient {
    pub up: bool,
}

#[async_trait]
impl KeyValueClient for StaticClient {
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

/// State with an initialized registry (no process metrics) and a static client.
pub fn test_state(up: bool) -> AppState {
    let state = uninitialized_state(up);
    state
        .registry()
        .initialize(&MetricsConfig::without_default_metrics())
        .unwrap();
    state
}

/// State whose registry was never initialized.
pub fn uninitialized_state(up: bool) -> AppState {
    let prober = HealthProber::new(Arc::new(StaticClient { up }), DEFAULT_PROBE_TIMEOUT);
    AppState::new(Arc::new(Registry::new()), prober).unwrap()
}
