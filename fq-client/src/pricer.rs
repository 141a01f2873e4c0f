//! Seam between the quote session and the authoritative service

use async_trait::async_trait;
use fq_common::{ParameterSnapshot, PartConfiguration, PriceBreakdown, Result};

/// Source of authoritative quotes and live parameter snapshots
///
/// Implementations report network trouble as `Error::Transient`; the session
/// treats every failure as a reason to keep showing its local estimate.
#[async_trait]
pub trait AuthoritativePricer: Send + Sync {
    /// Price a configuration against the server-held parameters
    async fn calculate(&self, config: &PartConfiguration) -> Result<PriceBreakdown>;

    /// Fetch the current flat parameter snapshot
    async fn fetch_snapshot(&self) -> Result<ParameterSnapshot>;
}
