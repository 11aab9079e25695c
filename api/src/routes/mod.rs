//! API route definitions.
//!
//! This module organizes all HTTP routes for the Depwatch API server.

mod health;
mod metrics;
mod redis;

pub use self::health::health_routes;
pub use self::metrics::metrics_routes;
pub use self::redis::redis_routes;
