//! Public base URL resolution from configuration or request headers.

use crate::AppError;
use axum::http::{HeaderMap, header};

/// Returns the public base URL used to build short links.
///
/// A configured base URL always wins. Otherwise it is derived from the `Host`
/// header: `http` for `localhost`/`127.0.0.1`, `https` for everything else.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if no base URL is configured and the
/// `Host` header is missing or not valid UTF-8.
pub fn resolve_base_url(configured: Option<&str>, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(base) = configured {
        return Ok(base.trim_end_matches('/').to_string());
    }

    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?
        .trim();

    if host.is_empty() || host.contains(['/', ' ', '@']) {
        return Err(AppError::bad_request(
            "Invalid Host header",
            serde_json::json!({}),
        ));
    }

    let hostname = if host.starts_with('[') {
        host.find(']').map_or(host, |end| &host[..=end])
    } else {
        host.split(':').next().unwrap_or(host)
    };

    let scheme = if matches!(hostname, "localhost" | "127.0.0.1" | "[::1]") {
        "http"
    } else {
        "https"
    };

    Ok(format!("{scheme}://{host}"))
}
