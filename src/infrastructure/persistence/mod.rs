//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgShortLinkRepository`] - short links and the scan counter
//! - [`PgUserRepository`] - dashboard accounts
//! - [`PgSessionRepository`] - login sessions

pub mod pg_session_repository;
pub mod pg_short_link_repository;
pub mod pg_user_repository;

pub use pg_session_repository::PgSessionRepository;
pub use pg_short_link_repository::PgShortLinkRepository;
pub use pg_user_repository::PgUserRepository;
