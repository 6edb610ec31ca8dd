//! Cookie session authentication for the web dashboard.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Redirect, Response},
};

use crate::application::services::auth_service::SESSION_COOKIE;
use crate::state::AppState;
use crate::utils::cookies::find_cookie;

/// Authenticates dashboard requests from the `session_id` cookie.
///
/// On success the caller's
/// [`OwnerContext`](crate::domain::entities::OwnerContext) is attached to the
/// request. A missing, unknown or expired session redirects to
/// `/dashboard/login` instead of answering `401`.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Redirect> {
    let Some(token) = find_cookie(req.headers(), SESSION_COOKIE) else {
        return Err(Redirect::to("/dashboard/login"));
    };

    match st.auth_service.resolve(&token).await {
        Ok(owner) => {
            req.extensions_mut().insert(owner);
            Ok(next.run(req).await)
        }
        Err(_) => Err(Redirect::to("/dashboard/login")),
    }
}
