//! Public error page targeted by failed redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::application::services::resolver::ErrorReason;

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: &'static str,
}

/// `GET /error?reason={not-found|deactivated|unavailable}`
///
/// Only the fixed messages of [`ErrorReason`] are rendered; unknown reason
/// codes show the generic message.
pub async fn error_page_handler(Query(query): Query<ErrorQuery>) -> impl IntoResponse {
    let reason = query
        .reason
        .as_deref()
        .map_or(ErrorReason::Unavailable, ErrorReason::from_code);

    let status = match reason {
        ErrorReason::NotFound => StatusCode::NOT_FOUND,
        ErrorReason::Deactivated => StatusCode::GONE,
        ErrorReason::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        ErrorTemplate {
            message: reason.message(),
        },
    )
}
