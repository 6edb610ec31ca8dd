//! Top-level router configuration combining API and web routes.
//!
//! # Route Structure
//!
//! - `GET  /{token}`     - Short link redirect (public)
//! - `GET  /health`      - Health check: database, visit ledger (public)
//! - `GET  /error`       - Redirect failure page (public)
//! - `/api/auth/*`       - Registration and login (public, strict rate limit)
//! - `/api/preview/*`    - QR images (public)
//! - `/api/*`            - REST API (session required)
//! - `/dashboard/*`      - Web UI (cookie session required)
//! - `/static/*`         - Static assets

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use crate::web;
use crate::web::handlers::error_page_handler;
use crate::web::middleware::web_auth;
use axum::response::Redirect;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Constructs the application router with all routes and middleware.
///
/// The redirect route carries no rate limit and no session check; every scan
/// must reach the resolver.
///
/// When `state.http.behind_proxy` is set, rate limiting keys on the client IP
/// from `X-Forwarded-For` / `X-Real-IP` instead of the peer socket address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let behind_proxy = state.http.behind_proxy;

    let api_protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer(behind_proxy));

    let api_auth = api::routes::auth_routes().layer(rate_limit::secure_layer(behind_proxy));

    let api_router = Router::new()
        .merge(api_protected)
        .merge(api_auth)
        .merge(api::routes::public_routes());

    let web_protected = web::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            web_auth::layer,
        ))
        .layer(rate_limit::layer(behind_proxy));

    let web_router = Router::new()
        .merge(web_protected)
        .merge(web::routes::public_routes());

    let router = Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/{token}", get(redirect_handler))
        .route("/health", get(health_handler))
        .route("/error", get(error_page_handler))
        .nest("/api", api_router)
        .nest("/dashboard", web_router)
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
