//! Handlers for QR code previews.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use validator::Validate;

use crate::api::dto::preview::{PreviewRequest, PreviewResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::resolve_base_url;

/// SVG QR code for an existing token.
///
/// # Endpoint
///
/// `GET /api/preview/{token}`
///
/// # Errors
///
/// - 404 JSON if the token is unknown
pub async fn token_preview_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let base = resolve_base_url(state.http.public_base_url.as_deref(), &headers)?;
    let svg = state.preview_service.token_svg(&token, &base).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "private, max-age=300"),
        ],
        svg,
    ))
}

/// QR code for a destination URL before the link is created.
///
/// # Endpoint
///
/// `POST /api/preview`
///
/// ```json
/// { "url": "https://example.com/menu" }
/// ```
pub async fn url_preview_handler(
    State(state): State<AppState>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    payload.validate()?;

    let qr_image_url = state.preview_service.url_preview(&payload.url)?;

    Ok(Json(PreviewResponse { qr_image_url }))
}
