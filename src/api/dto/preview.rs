//! DTOs for QR previews.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// `data:image/svg+xml;base64,...`
    pub qr_image_url: String,
}
