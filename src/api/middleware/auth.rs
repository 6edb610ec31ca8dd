//! Session authentication middleware for the JSON API.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::application::services::auth_service::SESSION_COOKIE;
use crate::utils::cookies::find_cookie;
use crate::{error::AppError, state::AppState};

/// Raw session token from `Authorization: Bearer` or the `session_id` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| find_cookie(headers, SESSION_COOKIE).filter(|t| !t.is_empty()))
}

/// Authenticates API requests and attaches the caller's
/// [`OwnerContext`](crate::domain::entities::OwnerContext).
///
/// # Credentials
///
/// ```text
/// Authorization: Bearer <session token>
/// Cookie: session_id=<session token>
/// ```
///
/// The bearer header wins when both are present.
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if no
/// credential is present or the session is unknown or expired.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = match AuthBearer::from_request_parts(&mut parts, &()).await {
        Ok(AuthBearer(token)) => Some(token),
        Err(_) => find_cookie(&parts.headers, SESSION_COOKIE),
    }
    .filter(|t| !t.is_empty())
    .ok_or_else(|| {
        AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Session token is missing"}),
        )
    })?;

    let owner = st.auth_service.resolve(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(owner);

    Ok(next.run(req).await)
}
