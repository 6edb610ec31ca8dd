//! Handler for the public short link redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::api::middleware::rate_limit::ClientIpKeyExtractor;
use crate::application::services::resolver::{
    DedupMode, Resolution, VisitContext, log_resolve_error,
};
use crate::domain::visit_marker::VisitMarker;
use crate::infrastructure::dedup::visit_fingerprint;
use crate::state::AppState;
use crate::utils::cookies::{SetCookie, find_cookie};
use crate::utils::extract_domain::resolve_base_url;

/// Resolves a token and redirects to its destination.
///
/// # Endpoint
///
/// `GET /{token}`
///
/// # Request Flow
///
/// 1. Read the `qr_visited_{token}` marker cookie and `Referer`
/// 2. Resolve the token; a fresh visit increments `scan_count`
/// 3. Answer `307` to the destination, setting the marker when newly issued
///
/// Every failure (unknown, deactivated, malformed token or store error)
/// answers `307` to `/error?reason=...`. Responses are never cacheable, so
/// each scan reaches the server.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let marker = find_cookie(&headers, &VisitMarker::cookie_name(&token));
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());
    let base_url = resolve_base_url(state.http.public_base_url.as_deref(), &headers).ok();

    let fingerprint = (state.resolver.effective_dedup_mode() == DedupMode::Server).then(|| {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok());
        let client_ip = ClientIpKeyExtractor::new(state.http.behind_proxy).client_ip(&headers, addr);
        visit_fingerprint(&state.http.fingerprint_secret, &client_ip.to_string(), user_agent)
    });

    let visit = VisitContext {
        marker: marker.as_deref(),
        referer,
        fingerprint: fingerprint.as_deref(),
        base_url: base_url.as_deref(),
        now: None,
    };

    match state.resolver.resolve(&token, visit).await {
        Ok(resolution) => {
            let secure = base_url
                .as_deref()
                .is_some_and(|b| b.starts_with("https://"));
            success_response(&token, resolution, state.resolver.settings().visit_window, secure)
        }
        Err(e) => {
            log_resolve_error(&token, &e);
            temporary_redirect(&e.reason().redirect_path())
        }
    }
}

fn success_response(
    token: &str,
    resolution: Resolution,
    window: chrono::Duration,
    secure: bool,
) -> Response {
    let mut response = temporary_redirect(&resolution.destination_url);

    if let Some(marker) = resolution.new_marker {
        let name = VisitMarker::cookie_name(token);
        let value = marker.encode();
        let cookie = SetCookie {
            name: &name,
            value: &value,
            max_age_secs: window.num_seconds(),
            secure,
        };
        if let Some(header_value) = cookie.to_header_value() {
            response
                .headers_mut()
                .append(header::SET_COOKIE, header_value);
        }
    }

    response
}

/// `307` with `Cache-Control: no-store`.
///
/// Destinations are stored as entered and may hold characters that are not
/// valid in a header; those are sent in their percent-encoded form.
fn temporary_redirect(location: &str) -> Response {
    let location = location_header(location)
        .unwrap_or_else(|| HeaderValue::from_static("/error?reason=unavailable"));

    (
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response()
}

/// `HeaderValue` accepts non-ASCII bytes as obs-text, so only plain ASCII is
/// sent verbatim.
fn location_header(location: &str) -> Option<HeaderValue> {
    if location.is_ascii()
        && let Ok(value) = HeaderValue::from_str(location)
    {
        return Some(value);
    }

    let encoded = url::Url::parse(location).ok()?;
    HeaderValue::from_str(encoded.as_str()).ok()
}
