//! Login and registration pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginTemplate {}

#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
struct RegisterTemplate {}

/// `GET /dashboard/login`
///
/// The form posts to `/api/auth/login`, which sets the `session_id` cookie.
pub async fn login_handler() -> impl IntoResponse {
    LoginTemplate {}
}

/// `GET /dashboard/register`
pub async fn register_handler() -> impl IntoResponse {
    RegisterTemplate {}
}
