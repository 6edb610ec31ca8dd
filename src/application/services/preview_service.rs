//! QR code rendering for dashboard previews.

use std::sync::Arc;

use base64::Engine as _;
use qrcode::{EcLevel, QrCode, render::svg};
use serde_json::json;

use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::validate_destination;

/// Smallest edge, in pixels, of a rendered preview.
pub const PREVIEW_SIZE_PX: u32 = 300;

/// Renders `data` as an SVG QR code with high error correction.
pub fn render_svg(data: &str) -> Result<String, AppError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H).map_err(|e| {
        AppError::bad_request("Cannot encode QR code", json!({ "reason": e.to_string() }))
    })?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(PREVIEW_SIZE_PX, PREVIEW_SIZE_PX)
        .quiet_zone(true)
        .build())
}

/// Wraps an SVG document in a `data:` URL.
pub fn svg_data_url(svg: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg)
    )
}

pub struct PreviewService<R: ShortLinkRepository> {
    repository: Arc<R>,
}

impl<R: ShortLinkRepository> PreviewService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// SVG QR code encoding the public short URL of `token`.
    ///
    /// Inactive links still render; the redirect endpoint handles deactivation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this token.
    pub async fn token_svg(&self, token: &str, base_url: &str) -> Result<String, AppError> {
        let link = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "token": token })))?;

        render_svg(&link.short_url(base_url))
    }

    /// Data URL of a QR code for an arbitrary destination, before a link exists.
    pub fn url_preview(&self, url: &str) -> Result<String, AppError> {
        let destination =
            validate_destination(url).map_err(|e| AppError::invalid_destination(e.to_string()))?;

        render_svg(&destination).map(|svg| svg_data_url(&svg))
    }
}
