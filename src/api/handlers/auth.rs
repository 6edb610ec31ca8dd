//! Handlers for registration, login and logout.

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::api::middleware::auth::session_token;
use crate::application::services::auth_service::{
    ClientInfo, Registration, SESSION_COOKIE, SESSION_TTL_DAYS,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::SetCookie;

fn session_cookie(state: &AppState, value: &str, max_age_secs: i64) -> Option<HeaderValue> {
    let secure = state
        .http
        .public_base_url
        .as_deref()
        .is_some_and(|b| b.starts_with("https://"));

    SetCookie {
        name: SESSION_COOKIE,
        value,
        max_age_secs,
        secure,
    }
    .to_header_value()
}

/// Creates an account.
///
/// # Endpoint
///
/// `POST /api/auth/register`
///
/// # Errors
///
/// - 400 for invalid fields
/// - 409 if the username or email is taken
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    let user = state
        .auth_service
        .register(Registration {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

/// Opens a session and sets the `session_id` cookie.
///
/// # Endpoint
///
/// `POST /api/auth/login`
///
/// The token is also returned in the body for bearer use.
pub async fn login_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let client = ClientInfo {
        ip_address: Some(addr.ip().to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let session = state
        .auth_service
        .login(&payload.email, &payload.password, client)
        .await?;

    let mut response = Json(LoginResponse {
        token: session.token.clone(),
        expires_at: session.expires_at,
        user_id: session.owner.user_id,
        username: session.owner.username,
    })
    .into_response();

    if let Some(cookie) = session_cookie(&state, &session.token, SESSION_TTL_DAYS * 24 * 3600) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }

    Ok(response)
}

/// Ends the current session and clears the cookie.
///
/// # Endpoint
///
/// `POST /api/auth/logout`
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        state.auth_service.logout(&token).await?;
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Some(cookie) = session_cookie(&state, "", 0) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }

    Ok(response)
}
