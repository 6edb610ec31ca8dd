//! Infrastructure layer for external integrations.
//!
//! Implements interfaces defined by the domain and application layers.
//!
//! - [`dedup`] - server-side visit ledger (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod dedup;
pub mod persistence;
