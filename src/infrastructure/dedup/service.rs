//! Visit ledger trait and error types.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger connection error: {0}")]
    ConnectionError(String),

    #[error("Ledger operation error: {0}")]
    OperationError(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Server-side, short-lived record of which clients already visited a token.
///
/// This is the hardened alternative to the client-held visit marker: the
/// dedup key is `(token, client fingerprint)` and entries expire after the
/// visit window. Check-and-set must be a single backend operation.
///
/// # Implementations
///
/// - [`crate::infrastructure::dedup::RedisVisitLedger`] - `SET NX EX` in Redis
/// - [`crate::infrastructure::dedup::NullVisitLedger`] - disabled ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitLedger: Send + Sync {
    /// Returns false when the ledger is a no-op and callers must use the cookie marker.
    fn is_enabled(&self) -> bool;

    /// Records a visit and returns true if none was recorded within `window_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the backend is unreachable. Callers fall
    /// back to the cookie marker in that case.
    async fn record_visit(&self, token: &str, fingerprint: &str, window_secs: u64)
    -> LedgerResult<bool>;

    /// Removes the entry for `(token, fingerprint)`.
    ///
    /// Used when a recorded visit could not be counted, so the next attempt
    /// from the same client is treated as fresh.
    async fn forget(&self, token: &str, fingerprint: &str) -> LedgerResult<()>;

    /// Checks if the ledger backend is healthy.
    async fn health_check(&self) -> bool;
}

/// Derives an opaque client fingerprint from the peer IP and User-Agent.
///
/// Keyed with the server secret so ledger keys do not expose client IPs.
pub fn visit_fingerprint(secret: &str, ip: &str, user_agent: Option<&str>) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(ip.as_bytes());
    mac.update(b"\n");
    mac.update(user_agent.unwrap_or("").as_bytes());
    hex::encode(&mac.finalize().into_bytes()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_opaque() {
        let a = visit_fingerprint("secret", "203.0.113.7", Some("Mozilla/5.0"));
        let b = visit_fingerprint("secret", "203.0.113.7", Some("Mozilla/5.0"));

        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(!a.contains("203.0.113.7"));
    }

    #[test]
    fn test_fingerprint_depends_on_inputs() {
        let base = visit_fingerprint("secret", "203.0.113.7", Some("UA"));

        assert_ne!(base, visit_fingerprint("secret", "203.0.113.8", Some("UA")));
        assert_ne!(base, visit_fingerprint("secret", "203.0.113.7", Some("UA2")));
        assert_ne!(base, visit_fingerprint("other", "203.0.113.7", Some("UA")));
    }

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::ConnectionError("refused".to_string());
        assert_eq!(err.to_string(), "Ledger connection error: refused");

        let err: Box<dyn std::error::Error> = Box::new(LedgerError::OperationError("timeout".into()));
        assert_eq!(err.to_string(), "Ledger operation error: timeout");
    }
}
