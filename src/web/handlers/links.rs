//! Link management page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};

use super::view::LinkView;
use crate::domain::entities::OwnerContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::resolve_base_url;

/// Renders `templates/links.html`: every link with toggle, edit and delete actions.
#[derive(Template, WebTemplate)]
#[template(path = "links.html")]
pub struct LinksTemplate {
    pub username: String,
    pub links: Vec<LinkView>,
}

/// Renders `templates/link_form.html` for creation (`link` is `None`) or editing.
#[derive(Template, WebTemplate)]
#[template(path = "link_form.html")]
pub struct LinkFormTemplate {
    pub username: String,
    pub link: Option<LinkView>,
}

/// `GET /dashboard/links`
pub async fn links_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let base = resolve_base_url(state.http.public_base_url.as_deref(), &headers)?;

    let links = state
        .link_service
        .list(&owner, None)
        .await?
        .into_iter()
        .map(|link| LinkView::new(link, &base))
        .collect();

    Ok(LinksTemplate {
        username: owner.username,
        links,
    })
}

/// `GET /dashboard/links/new`
pub async fn new_link_handler(Extension(owner): Extension<OwnerContext>) -> impl IntoResponse {
    LinkFormTemplate {
        username: owner.username,
        link: None,
    }
}

/// `GET /dashboard/links/{id}/edit`
///
/// Foreign links answer 403 and unknown ones 404.
pub async fn edit_link_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let base = resolve_base_url(state.http.public_base_url.as_deref(), &headers)?;
    let link = state.link_service.get(&owner, id).await?;

    Ok(LinkFormTemplate {
        username: owner.username,
        link: Some(LinkView::new(link, &base)),
    })
}
