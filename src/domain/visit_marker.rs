//! Client-held visit marker used to deduplicate scan counting.
//!
//! A marker is a cookie named `qr_visited_{token}` whose value is the unix
//! timestamp at which it stops being valid. The browser drops it after
//! `Max-Age`, and the resolver also rejects it once the embedded expiry has
//! passed, so a replayed or stale cookie does not suppress counting forever.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Cookie name prefix; the token is appended.
pub const MARKER_COOKIE_PREFIX: &str = "qr_visited_";

/// Default dedup window.
pub const DEFAULT_VISIT_WINDOW_SECS: u64 = 3600;

/// A decoded visit marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitMarker {
    expires_at: DateTime<Utc>,
}

impl VisitMarker {
    /// Issues a fresh marker valid for `window` from `now`.
    pub fn issue(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            expires_at: now + window,
        }
    }

    /// Parses a cookie value. Returns `None` for anything that is not a unix timestamp.
    pub fn parse(value: &str) -> Option<Self> {
        let secs: i64 = value.trim().parse().ok()?;
        let expires_at = Utc.timestamp_opt(secs, 0).single()?;
        Some(Self { expires_at })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Cookie value encoding of this marker.
    pub fn encode(&self) -> String {
        self.expires_at.timestamp().to_string()
    }

    /// Cookie name for the marker of `token`.
    pub fn cookie_name(token: &str) -> String {
        format!("{MARKER_COOKIE_PREFIX}{token}")
    }
}
