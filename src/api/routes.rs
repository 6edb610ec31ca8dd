//! API route configuration.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    login_handler, logout_handler, register_handler, toggle_link_handler,
    token_preview_handler, update_link_handler, url_preview_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Routes requiring a session, protected by [`crate::api::middleware::auth`].
///
/// # Endpoints
///
/// - `GET    /links`             - list the caller's links
/// - `POST   /links`             - create a link
/// - `GET    /links/{id}`        - one link
/// - `PUT    /links/{id}`        - replace name and destination
/// - `DELETE /links/{id}`        - delete a link
/// - `PATCH  /links/{id}/toggle` - flip active
/// - `POST   /preview`           - QR preview for a URL
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{id}/toggle", patch(toggle_link_handler))
        .route("/preview", post(url_preview_handler))
}

/// Credential endpoints.
///
/// - `POST /auth/register`
/// - `POST /auth/login`
/// - `POST /auth/logout`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
}

/// Public, unauthenticated API routes.
///
/// - `GET /preview/{token}` - SVG QR code of a short URL
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/preview/{token}", get(token_preview_handler))
}
