//! No-op ledger used when server-side dedup is disabled.

use super::service::{LedgerResult, VisitLedger};
use async_trait::async_trait;
use tracing::debug;

/// A ledger that records nothing and reports itself disabled.
///
/// Used in cookie dedup mode, and as the fallback when Redis cannot be reached
/// at startup.
pub struct NullVisitLedger;

impl NullVisitLedger {
    pub fn new() -> Self {
        debug!("Using NullVisitLedger (cookie dedup)");
        Self
    }
}

impl Default for NullVisitLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisitLedger for NullVisitLedger {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn record_visit(
        &self,
        _token: &str,
        _fingerprint: &str,
        _window_secs: u64,
    ) -> LedgerResult<bool> {
        Ok(true)
    }

    async fn forget(&self, _token: &str, _fingerprint: &str) -> LedgerResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
