//! Runtime statistics collector.
//!
//! Complements the OS process collector with values only the process itself
//! knows: how long it has been up and what the async runtime is doing.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntGauge, Opts};
use std::time::Instant;

/// Gauges recomputed on every scrape.
pub struct RuntimeCollector {
    started: Instant,
    uptime: Gauge,
    workers: IntGauge,
    alive_tasks: IntGauge,
}

impl RuntimeCollector {
    /// Creates a collector reporting uptime relative to `started`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gauge descriptors are invalid.
    pub fn new(started: Instant) -> prometheus::Result<Self> {
        Ok(Self {
            started,
            uptime: Gauge::with_opts(Opts::new(
                "process_uptime_seconds",
                "Seconds since the metrics registry was created.",
            ))?,
            workers: IntGauge::with_opts(Opts::new(
                "tokio_runtime_workers",
                "Number of worker threads used by the async runtime.",
            ))?,
            alive_tasks: IntGauge::with_opts(Opts::new(
                "tokio_runtime_alive_tasks",
                "Number of tasks currently alive in the async runtime.",
            ))?,
        })
    }
}

impl Collector for RuntimeCollector {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.uptime.desc();
        descs.extend(self.workers.desc());
        descs.extend(self.alive_tasks.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.uptime.set(self.started.elapsed().as_secs_f64());
        let mut families = self.uptime.collect();

        // Outside a runtime (e.g. a blocking test thread) the runtime gauges are omitted.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let metrics = handle.metrics();
            self.workers
                .set(i64::try_from(metrics.num_workers()).unwrap_or(i64::MAX));
            self.alive_tasks
                .set(i64::try_from(metrics.num_alive_tasks()).unwrap_or(i64::MAX));
            families.extend(self.workers.collect());
            families.extend(self.alive_tasks.collect());
        }

        families
    }
}
