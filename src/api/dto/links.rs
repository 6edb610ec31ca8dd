//! DTOs for owner link management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::domain::entities::{OwnerSummary, ShortLink};

/// Body of `POST /api/links` and `PUT /api/links/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct LinkRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: String,
}

/// Query of `GET /api/links`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Limit clamped to 1..=500; `None` lists everything.
    pub fn limit(&self) -> Option<i64> {
        self.limit.map(|l| l.clamp(1, 500))
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub token: String,
    pub name: String,
    pub destination_url: String,
    pub short_url: String,
    pub active: bool,
    pub scan_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: ShortLink, base_url: &str) -> Self {
        Self {
            short_url: link.short_url(base_url),
            id: link.id,
            token: link.token,
            name: link.name,
            destination_url: link.destination_url,
            active: link.active,
            scan_count: link.scan_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub summary: OwnerSummaryResponse,
    pub items: Vec<LinkResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerSummaryResponse {
    pub total_links: i64,
    pub active_links: i64,
    pub total_scans: i64,
}

impl From<OwnerSummary> for OwnerSummaryResponse {
    fn from(s: OwnerSummary) -> Self {
        Self {
            total_links: s.total_links,
            active_links: s.active_links,
            total_scans: s.total_scans,
        }
    }
}
