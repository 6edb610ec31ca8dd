//! Dashboard home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};

use super::view::LinkView;
use crate::application::services::link_service::RECENT_LINKS_LIMIT;
use crate::domain::entities::{OwnerContext, OwnerSummary};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::resolve_base_url;

/// Renders `templates/dashboard.html`: totals and the most recent links.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub summary: OwnerSummary,
    pub recent: Vec<LinkView>,
}

/// `GET /dashboard`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let base = resolve_base_url(state.http.public_base_url.as_deref(), &headers)?;

    let summary = state.link_service.summary(&owner).await?;
    let recent = state
        .link_service
        .list(&owner, Some(RECENT_LINKS_LIMIT))
        .await?
        .into_iter()
        .map(|link| LinkView::new(link, &base))
        .collect();

    Ok(DashboardTemplate {
        username: owner.username,
        summary,
        recent,
    })
}
