//! Event-loop lag monitoring.
//!
//! A timer is scheduled at a fixed interval; the difference between when each
//! tick was due and when the task actually observed it is the time the runtime
//! spent busy elsewhere.

use prometheus::Gauge;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Background task feeding the event-loop lag gauge.
pub struct EventLoopLagMonitor {
    gauge: Gauge,
    interval_duration: Duration,
}

impl EventLoopLagMonitor {
    /// Creates a new lag monitor.
    ///
    /// # Arguments
    ///
    /// * `gauge` - Gauge receiving the latest lag in seconds
    /// * `interval_duration` - How often to sample
    #[must_use]
    pub fn new(gauge: Gauge, interval_duration: Duration) -> Self {
        Self {
            gauge,
            interval_duration,
        }
    }

    /// Lag between when a tick was `scheduled` and when it was `observed`.
    #[must_use]
    pub fn lag_between(scheduled: Instant, observed: Instant) -> Duration {
        observed.saturating_duration_since(scheduled)
    }

    /// Starts the sampling loop.
    ///
    /// Runs until the task is aborted.
    pub async fn run(self) {
        let mut tick = interval(self.interval_duration);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let scheduled = tick.tick().await;
            let lag = Self::lag_between(scheduled, Instant::now());
            self.gauge.set(lag.as_secs_f64());

            if lag > self.interval_duration {
                tracing::warn!(
                    lag_ms = u64::try_from(lag.as_millis()).unwrap_or(u64::MAX),
                    "Event loop lag exceeds sampling interval"
                );
            }
        }
    }

    /// Spawns [`Self::run`] on the current runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
