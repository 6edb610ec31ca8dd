//! Web dashboard route configuration.

use crate::state::AppState;
use crate::web::handlers::{
    dashboard_handler, edit_link_handler, links_handler, login_handler, new_link_handler,
    register_handler,
};
use axum::{Router, routing::get};

/// Dashboard pages requiring a session cookie.
///
/// Protected via [`crate::web::middleware::web_auth`].
///
/// # Endpoints
///
/// - `GET /`                - totals and recent links
/// - `GET /links`           - all links
/// - `GET /links/new`       - creation form
/// - `GET /links/{id}/edit` - edit form
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/links", get(links_handler))
        .route("/links/new", get(new_link_handler))
        .route("/links/{id}/edit", get(edit_link_handler))
}

/// Public dashboard pages.
///
/// - `GET /login`
/// - `GET /register`
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_handler))
        .route("/register", get(register_handler))
}
