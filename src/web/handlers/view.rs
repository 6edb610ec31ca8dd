//! View models shared by dashboard templates.

use crate::domain::entities::ShortLink;

/// A link as shown in dashboard tables and forms.
pub struct LinkView {
    pub id: i64,
    pub token: String,
    pub name: String,
    pub destination_url: String,
    pub short_url: String,
    pub qr_url: String,
    pub active: bool,
    pub scan_count: i64,
    pub created_at: String,
}

impl LinkView {
    pub fn new(link: ShortLink, base_url: &str) -> Self {
        Self {
            short_url: link.short_url(base_url),
            qr_url: format!("/api/preview/{}", link.token),
            created_at: link.created_at.format("%Y-%m-%d %H:%M").to_string(),
            id: link.id,
            token: link.token,
            name: link.name,
            destination_url: link.destination_url,
            active: link.active,
            scan_count: link.scan_count,
        }
    }
}
