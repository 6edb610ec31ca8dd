//! Short link entity binding a public token to a destination URL.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted short link.
///
/// `token` is immutable once created and is the public lookup key.
/// `scan_count` only moves forward, and only through the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub owner_id: i64,
    pub token: String,
    pub name: String,
    pub destination_url: String,
    pub active: bool,
    pub scan_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    /// Returns true when `user_id` owns this link.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Public short URL for this link under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.token)
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub owner_id: i64,
    pub token: String,
    pub name: String,
    pub destination_url: String,
}

/// Replacement of the editable fields of a link.
#[derive(Debug, Clone)]
pub struct ShortLinkPatch {
    pub name: String,
    pub destination_url: String,
}

/// Per-owner totals shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OwnerSummary {
    pub total_links: i64,
    pub active_links: i64,
    pub total_scans: i64,
}

#[cfg(test)]
pub(crate) fn sample_link(id: i64, owner_id: i64, token: &str, active: bool) -> ShortLink {
    let now = Utc::now();
    ShortLink {
        id,
        owner_id,
        token: token.to_string(),
        name: format!("link {id}"),
        destination_url: "https://example.com/page".to_string(),
        active,
        scan_count: 0,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let link = sample_link(1, 7, "Ab3xYz", true);

        assert_eq!(
            link.short_url("https://qr.example.com/"),
            "https://qr.example.com/Ab3xYz"
        );
        assert_eq!(
            link.short_url("https://qr.example.com"),
            "https://qr.example.com/Ab3xYz"
        );
    }

    #[test]
    fn test_ownership() {
        let link = sample_link(1, 7, "Ab3xYz", true);

        assert!(link.is_owned_by(7));
        assert!(!link.is_owned_by(8));
    }
}
