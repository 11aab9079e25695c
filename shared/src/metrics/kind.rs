//! Metric kinds.

use serde::{Deserialize, Serialize};

/// Kind of a registered metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// A counter that only increases (e.g., request count).
    Counter,
    /// A gauge that can go up or down (e.g., resident memory).
    Gauge,
    /// A histogram for measuring distributions (e.g., request latency).
    Histogram,
}

impl MetricKind {
    /// Infers the kind of a collector-provided metric from its name.
    ///
    /// Collectors registered through [`super::Registry::register_collector`]
    /// expose counters and gauges only; counters follow the `_total` naming
    /// convention.
    #[must_use]
    pub fn infer(name: &str) -> Self {
        if name.ends_with("_total") {
            Self::Counter
        } else {
            Self::Gauge
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Gauge => write!(f, "gauge"),
            Self::Histogram => write!(f, "histogram"),
        }
    }
}
