//! Metrics registry and built-in collectors.
//!
//! This module provides the [`Registry`] that owns every metric the process
//! exposes, the collectors for process and runtime statistics, and the
//! event-loop lag monitor.

pub mod kind;
pub mod lag;
pub mod registry;
pub mod runtime;

pub use kind::MetricKind;
pub use lag::EventLoopLagMonitor;
pub use registry::{MetricsError, Registry, EVENT_LOOP_LAG};
pub use runtime::RuntimeCollector;
