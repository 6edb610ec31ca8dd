//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP
//! handlers. Owner operations take an explicit
//! [`crate::domain::entities::OwnerContext`].
//!
//! # Available Services
//!
//! - [`services::token_minter::TokenMinter`] - unique short token generation
//! - [`services::resolver::Resolver`] - token resolution and scan counting
//! - [`services::link_service::LinkService`] - owner-scoped link management
//! - [`services::auth_service::AuthService`] - accounts and sessions
//! - [`services::preview_service::PreviewService`] - QR code rendering

pub mod services;
