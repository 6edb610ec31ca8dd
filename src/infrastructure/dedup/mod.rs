//! Server-side visit deduplication.
//!
//! Provides a [`VisitLedger`] trait with two implementations:
//! - [`RedisVisitLedger`] - Redis-backed ledger with TTL keys
//! - [`NullVisitLedger`] - no-op, cookie marker only

mod null_ledger;
mod redis_ledger;
mod service;

pub use null_ledger::NullVisitLedger;
pub use redis_ledger::RedisVisitLedger;
pub use service::{LedgerError, LedgerResult, VisitLedger, visit_fingerprint};

#[cfg(test)]
pub use service::MockVisitLedger;
