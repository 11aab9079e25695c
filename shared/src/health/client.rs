//! Dependency client capability.

use super::result::ProbeFailure;
use async_trait::async_trait;

/// Minimal capability the prober needs from a key-value store client.
///
/// Implementations must be shareable across concurrent probes.
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Display name of the dependency used in health messages (e.g. `Redis`).
    fn name(&self) -> &str;

    /// Performs one minimal round-trip to the dependency.
    ///
    /// # Errors
    ///
    /// Returns the reason the round-trip failed.
    async fn ping(&self) -> Result<(), ProbeFailure>;

    /// Marks any cached connection as unusable.
    ///
    /// Called after a ping was cancelled by the timeout. The next ping must
    /// not reuse the handle that stalled.
    fn reset(&self) {}
}
