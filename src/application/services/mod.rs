//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod preview_service;
pub mod resolver;
pub mod token_minter;

pub use auth_service::AuthService;
pub use link_service::LinkService;
pub use preview_service::PreviewService;
pub use resolver::Resolver;
pub use token_minter::TokenMinter;
