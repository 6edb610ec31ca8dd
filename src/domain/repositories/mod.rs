//! Repository trait definitions for the domain layer.
//!
//! Traits define the data contracts; PostgreSQL implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! with `mockall` for unit tests.
//!
//! - [`ShortLinkRepository`] - short link CRUD and the atomic scan counter
//! - [`UserRepository`] - dashboard accounts
//! - [`SessionRepository`] - login sessions

pub mod session_repository;
pub mod short_link_repository;
pub mod user_repository;

pub use session_repository::SessionRepository;
pub use short_link_repository::ShortLinkRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use short_link_repository::MockShortLinkRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
