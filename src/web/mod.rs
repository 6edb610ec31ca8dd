//! Web dashboard layer for browser-based UI.
//!
//! Server-rendered Askama pages for managing links. Forms submit to the JSON
//! API through `static/app.js`.
//!
//! # Modules
//!
//! - [`handlers`] - Template rendering handlers
//! - [`middleware`] - Cookie session authentication
//! - [`routes`] - Dashboard route configuration

pub mod handlers;
pub mod middleware;
pub mod routes;
