//! Handlers for owner link management.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

use crate::api::dto::links::{LinkListResponse, LinkRequest, LinkResponse, ListQuery};
use crate::domain::entities::OwnerContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::resolve_base_url;

fn base_url(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    resolve_base_url(state.http.public_base_url.as_deref(), headers)
}

/// Lists the caller's links with dashboard totals.
///
/// # Endpoint
///
/// `GET /api/links?limit=N`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<LinkListResponse>, AppError> {
    let base = base_url(&state, &headers)?;

    let links = state.link_service.list(&owner, query.limit()).await?;
    let summary = state.link_service.summary(&owner).await?;

    Ok(Json(LinkListResponse {
        summary: summary.into(),
        items: links
            .into_iter()
            .map(|link| LinkResponse::from_link(link, &base))
            .collect(),
    }))
}

/// Creates a link with a freshly minted token.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// ```json
/// { "name": "Menu", "url": "https://example.com/menu" }
/// ```
///
/// # Errors
///
/// - 400 for an invalid name or destination
/// - 500 if no unique token could be minted
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    headers: HeaderMap,
    Json(payload): Json<LinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;
    let base = base_url(&state, &headers)?;

    let link = state
        .link_service
        .create(&owner, &payload.name, &payload.url)
        .await?;

    Ok((StatusCode::CREATED, Json(LinkResponse::from_link(link, &base))))
}

/// `GET /api/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<LinkResponse>, AppError> {
    let base = base_url(&state, &headers)?;
    let link = state.link_service.get(&owner, id).await?;

    Ok(Json(LinkResponse::from_link(link, &base)))
}

/// Replaces name and destination. The token and scan count are kept.
///
/// # Endpoint
///
/// `PUT /api/links/{id}`
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;
    let base = base_url(&state, &headers)?;

    let link = state
        .link_service
        .update(&owner, id, &payload.name, &payload.url)
        .await?;

    Ok(Json(LinkResponse::from_link(link, &base)))
}

/// Flips the active flag.
///
/// # Endpoint
///
/// `PATCH /api/links/{id}/toggle`
pub async fn toggle_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<LinkResponse>, AppError> {
    let base = base_url(&state, &headers)?;
    let link = state.link_service.toggle_active(&owner, id).await?;

    Ok(Json(LinkResponse::from_link(link, &base)))
}

/// `DELETE /api/links/{id}` answers `204 No Content`.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
