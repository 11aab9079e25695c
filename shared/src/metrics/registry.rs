//! Process-wide metrics registry.
//!
//! The [`Registry`] wraps a Prometheus registry with an explicit lifecycle:
//! it is constructed, initialized once at startup, and then shared by handle
//! with whoever needs to record or serialize metrics.

use super::kind::MetricKind;
use super::runtime::RuntimeCollector;
use crate::config::MetricsConfig;
use prometheus::core::Collector;
use prometheus::{CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, TextEncoder};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Instant;
use thiserror::Error;

/// Name of the event-loop lag gauge.
pub const EVENT_LOOP_LAG: &str = "runtime_event_loop_lag_seconds";

/// Errors that can occur during metric registration and serialization.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The metric name is already registered with a different kind.
    #[error("Metric '{name}' is already registered as a {existing}, cannot register it as a {requested}")]
    KindConflict {
        /// The conflicting metric name.
        name: String,
        /// Kind of the existing registration.
        existing: MetricKind,
        /// Kind that was requested.
        requested: MetricKind,
    },

    /// The metric name is already registered with the same kind but a different shape
    /// (for example a labelled vector versus a single gauge, or as part of another collector).
    #[error("Metric '{0}' is already registered with a different shape")]
    ShapeConflict(String),

    /// [`Registry::serialize`] was called before [`Registry::initialize`].
    #[error("Metrics registry has not been initialized")]
    Uninitialized,

    /// OS process introspection is not available on this platform.
    #[error("Process metrics are unavailable: {0}")]
    Unsupported(String),

    /// Failed to acquire lock on the registry index.
    #[error("Failed to acquire lock on metrics registry")]
    LockError,

    /// Error reported by the Prometheus client.
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

struct Entry {
    kind: MetricKind,
    /// Typed handle for metrics created through the registry; `None` for
    /// names provided by a collector.
    handle: Option<Box<dyn Any + Send + Sync>>,
}

/// Collection of metric producers keyed by metric name.
///
/// Registration is idempotent: asking for an existing name with the same kind
/// returns the handle that is already registered. Asking for it with another
/// kind fails with [`MetricsError::KindConflict`].
///
/// # Example
///
/// ```
/// use shared::config::MetricsConfig;
/// use shared::metrics::Registry;
///
/// let registry = Registry::new();
/// registry.initialize(&MetricsConfig::without_default_metrics()).unwrap();
///
/// let requests = registry
///     .counter("requests_total", "Requests served", &["route"])
///     .unwrap();
/// requests.with_label_values(&["/metrics"]).inc();
///
/// let text = registry.serialize().unwrap();
/// assert!(text.contains("requests_total{route=\"/metrics\"} 1"));
/// ```
pub struct Registry {
    inner: prometheus::Registry,
    prefix: Option<String>,
    index: RwLock<HashMap<String, Entry>>,
    initialized: AtomicBool,
    created_at: Instant,
}

impl Registry {
    /// Creates an empty, uninitialized registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: prometheus::Registry::new(),
            prefix: None,
            index: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
            created_at: Instant::now(),
        }
    }

    /// Creates an empty registry whose application metrics are namespaced with `prefix`.
    ///
    /// Built-in `process_*` and runtime metrics are never prefixed.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Registers the built-in metrics and marks the registry as initialized.
    ///
    /// With `collect_default_metrics` enabled this registers the OS process
    /// collector, the runtime collector and the event-loop lag gauge. Calling
    /// it again is a no-op because every registration is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - process introspection is unavailable on this platform
    /// - a built-in name was already registered with another kind
    pub fn initialize(&self, config: &MetricsConfig) -> Result<(), MetricsError> {
        if config.collect_default_metrics {
            self.register_collector(process_collector()?)?;
            self.register_collector(Box::new(RuntimeCollector::new(self.created_at)?))?;
            self.event_loop_lag()?;
        }

        let first = !self.initialized.swap(true, Ordering::AcqRel);
        if first {
            tracing::info!(
                default_metrics = config.collect_default_metrics,
                metrics = self.len(),
                "Metrics registry initialized"
            );
        }
        Ok(())
    }

    /// Returns true once [`Self::initialize`] has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Registers (or returns the existing) labelled counter.
    ///
    /// # Errors
    ///
    /// Returns an error on a kind conflict or an invalid metric name.
    pub fn counter(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<CounterVec, MetricsError> {
        let name = self.qualify(name);
        self.register_with(&name, MetricKind::Counter, || {
            CounterVec::new(Opts::new(name.as_str(), help), labels)
        })
    }

    /// Registers (or returns the existing) labelled gauge.
    ///
    /// # Errors
    ///
    /// Returns an error on a kind conflict or an invalid metric name.
    pub fn gauge(&self, name: &str, help: &str, labels: &[&str]) -> Result<GaugeVec, MetricsError> {
        let name = self.qualify(name);
        self.register_with(&name, MetricKind::Gauge, || {
            GaugeVec::new(Opts::new(name.as_str(), help), labels)
        })
    }

    /// Registers (or returns the existing) labelled histogram.
    ///
    /// # Errors
    ///
    /// Returns an error on a kind conflict, an invalid metric name or invalid buckets.
    pub fn histogram(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
        buckets: &[f64],
    ) -> Result<HistogramVec, MetricsError> {
        let name = self.qualify(name);
        self.register_with(&name, MetricKind::Histogram, || {
            HistogramVec::new(
                HistogramOpts::new(name.as_str(), help).buckets(buckets.to_vec()),
                labels,
            )
        })
    }

    /// Registers (or returns the existing) event-loop lag gauge.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken by a metric of another kind.
    pub fn event_loop_lag(&self) -> Result<Gauge, MetricsError> {
        self.register_with(EVENT_LOOP_LAG, MetricKind::Gauge, || {
            Gauge::with_opts(Opts::new(
                EVENT_LOOP_LAG,
                "Lag of the async runtime's timer wheel in seconds.",
            ))
        })
    }

    /// Registers a collector that produces its own metric families.
    ///
    /// The kind of each name is inferred with [`MetricKind::infer`]. When every
    /// name the collector describes is already registered with the same kind,
    /// the call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if one of its names conflicts with an existing registration.
    pub fn register_collector(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        let names: Vec<(String, MetricKind)> = collector
            .desc()
            .iter()
            .map(|d| (d.fq_name.clone(), MetricKind::infer(&d.fq_name)))
            .collect();

        let mut index = self.index.write().map_err(|_| MetricsError::LockError)?;

        let mut known = 0;
        for (name, kind) in &names {
            if let Some(entry) = index.get(name) {
                if entry.kind != *kind {
                    return Err(MetricsError::KindConflict {
                        name: name.clone(),
                        existing: entry.kind,
                        requested: *kind,
                    });
                }
                if entry.handle.is_some() {
                    return Err(MetricsError::ShapeConflict(name.clone()));
                }
                known += 1;
            }
        }

        if known == names.len() {
            return Ok(());
        }
        if known > 0 {
            let name = names
                .iter()
                .find(|(n, _)| index.contains_key(n))
                .map(|(n, _)| n.clone())
                .unwrap_or_default();
            return Err(MetricsError::ShapeConflict(name));
        }

        self.inner.register(collector)?;
        for (name, kind) in names {
            tracing::debug!(metric = %name, %kind, "Registered collector metric");
            index.insert(name, Entry { kind, handle: None });
        }
        Ok(())
    }

    /// Renders every registered metric in the Prometheus text exposition format.
    ///
    /// Collectors that fail to read the OS omit their samples; the rest of the
    /// snapshot is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Uninitialized`] if [`Self::initialize`] never ran.
    pub fn serialize(&self) -> Result<String, MetricsError> {
        if !self.is_initialized() {
            return Err(MetricsError::Uninitialized);
        }

        let families = self.inner.gather();
        let mut out = String::new();
        TextEncoder::new().encode_utf8(&families, &mut out)?;
        Ok(out)
    }

    /// Content type of [`Self::serialize`] output.
    #[must_use]
    pub fn content_type() -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Returns the kind registered under `name`, if any.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<MetricKind> {
        self.index
            .read()
            .ok()
            .and_then(|index| index.get(name).map(|e| e.kind))
    }

    /// Number of registered metric names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().map(|index| index.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn qualify(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{name}"),
            None => name.to_string(),
        }
    }

    fn register_with<C>(
        &self,
        name: &str,
        kind: MetricKind,
        build: impl FnOnce() -> prometheus::Result<C>,
    ) -> Result<C, MetricsError>
    where
        C: Collector + Clone + 'static,
    {
        let mut index = self.index.write().map_err(|_| MetricsError::LockError)?;

        if let Some(entry) = index.get(name) {
            if entry.kind != kind {
                return Err(MetricsError::KindConflict {
                    name: name.to_string(),
                    existing: entry.kind,
                    requested: kind,
                });
            }
            return entry
                .handle
                .as_ref()
                .and_then(|h| h.downcast_ref::<C>())
                .cloned()
                .ok_or_else(|| MetricsError::ShapeConflict(name.to_string()));
        }

        let metric = build()?;
        self.inner.register(Box::new(metric.clone()))?;
        index.insert(
            name.to_string(),
            Entry {
                kind,
                handle: Some(Box::new(metric.clone())),
            },
        );
        tracing::debug!(metric = name, %kind, "Registered metric");
        Ok(metric)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.prefix)
            .field("metrics", &self.len())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

#[cfg(target_os = "linux")]
fn process_collector() -> Result<Box<dyn Collector>, MetricsError> {
    if std::fs::metadata("/proc/self/stat").is_err() {
        return Err(MetricsError::Unsupported(
            "/proc/self/stat is not readable".to_string(),
        ));
    }
    Ok(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))
}

#[cfg(not(target_os = "linux"))]
fn process_collector() -> Result<Box<dyn Collector>, MetricsError> {
    Err(MetricsError::Unsupported(format!(
        "no process collector for {}",
        std::env::consts::OS
    )))
}
