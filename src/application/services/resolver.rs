//! Token resolution: lookup, activity check, visit dedup and scan counting.
//!
//! ```text
//! Unresolved ──► NotFound ─────────────┐
//!            ├─► Found-Inactive ───────┼─► ErrorRedirected
//!            └─► Found-Active ─► Counted ────┐
//!                             └► NotCounted ─┴─► Redirected
//! ```
//!
//! No retries happen at this layer.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error, warn};

use crate::domain::repositories::ShortLinkRepository;
use crate::domain::visit_marker::{DEFAULT_VISIT_WINDOW_SECS, VisitMarker};
use crate::error::AppError;
use crate::infrastructure::dedup::VisitLedger;

/// Tokens the redirect endpoint accepts before touching the store.
static TOKEN_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid token regex"));

/// Which dedup signal decides whether a visit is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    /// Client-held `qr_visited_{token}` cookie.
    Cookie,
    /// Server-side ledger keyed by token and client fingerprint.
    Server,
}

impl DedupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupMode::Cookie => "cookie",
            DedupMode::Server => "server",
        }
    }
}

impl std::str::FromStr for DedupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cookie" => Ok(DedupMode::Cookie),
            "server" => Ok(DedupMode::Server),
            other => Err(format!("unknown dedup mode '{other}'")),
        }
    }
}

/// Resolver policy.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub visit_window: Duration,
    pub dedup_mode: DedupMode,
    /// Skip counting when the `Referer` points at the dashboard.
    ///
    /// Referer headers are client-controlled; this only filters honest
    /// previews and can be spoofed in both directions.
    pub dashboard_bypass: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            visit_window: Duration::seconds(DEFAULT_VISIT_WINDOW_SECS as i64),
            dedup_mode: DedupMode::Cookie,
            dashboard_bypass: false,
        }
    }
}

/// Request-derived inputs to a resolution.
#[derive(Debug, Clone, Default)]
pub struct VisitContext<'a> {
    /// Raw value of the `qr_visited_{token}` cookie, if sent.
    pub marker: Option<&'a str>,
    pub referer: Option<&'a str>,
    /// Opaque client fingerprint for the server ledger.
    pub fingerprint: Option<&'a str>,
    /// Public base URL, used to recognise dashboard referers.
    pub base_url: Option<&'a str>,
    /// Evaluation time; `None` means now.
    pub now: Option<DateTime<Utc>>,
}

/// Why a visit was not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MarkerPresent,
    LedgerHit,
    DashboardPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Counted { scan_count: i64 },
    NotCounted(SkipReason),
}

/// Successful resolution: where to redirect and which marker to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub destination_url: String,
    pub outcome: ScanOutcome,
    /// Marker to set on the response. Only present when a visit was counted in cookie mode.
    pub new_marker: Option<VisitMarker>,
}

/// User-facing failure reasons. This set is closed; nothing else reaches the error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    NotFound,
    Deactivated,
    Unavailable,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::NotFound => "not-found",
            ErrorReason::Deactivated => "deactivated",
            ErrorReason::Unavailable => "unavailable",
        }
    }

    /// Parses a reason code; unknown codes become [`ErrorReason::Unavailable`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-found" => ErrorReason::NotFound,
            "deactivated" => ErrorReason::Deactivated,
            _ => ErrorReason::Unavailable,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorReason::NotFound => "This QR code does not exist.",
            ErrorReason::Deactivated => "This QR code has been deactivated by its owner.",
            ErrorReason::Unavailable => "This QR code cannot be opened right now.",
        }
    }

    /// Fixed same-origin error page location.
    pub fn redirect_path(&self) -> String {
        format!("/error?reason={}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("malformed token")]
    Malformed,

    #[error("unknown token")]
    NotFound,

    #[error("link is deactivated")]
    Deactivated,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl ResolveError {
    pub fn reason(&self) -> ErrorReason {
        match self {
            ResolveError::NotFound => ErrorReason::NotFound,
            ResolveError::Deactivated => ErrorReason::Deactivated,
            ResolveError::Malformed | ResolveError::Store(_) => ErrorReason::Unavailable,
        }
    }
}

enum VisitDecision {
    Fresh { issue_marker: bool },
    Skip(SkipReason),
}

/// Resolves public tokens to redirect decisions.
pub struct Resolver<R: ShortLinkRepository> {
    repository: Arc<R>,
    ledger: Arc<dyn VisitLedger>,
    settings: ResolverSettings,
}

impl<R: ShortLinkRepository> Resolver<R> {
    pub fn new(repository: Arc<R>, ledger: Arc<dyn VisitLedger>, settings: ResolverSettings) -> Self {
        Self {
            repository,
            ledger,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Dedup mode in effect, after falling back when the ledger is disabled.
    pub fn effective_dedup_mode(&self) -> DedupMode {
        match self.settings.dedup_mode {
            DedupMode::Server if self.ledger.is_enabled() => DedupMode::Server,
            _ => DedupMode::Cookie,
        }
    }

    /// Resolves `token` and, when the visit is fresh, increments its scan count.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Malformed`] if the token cannot be a stored token
    /// - [`ResolveError::NotFound`] if no link has this token
    /// - [`ResolveError::Deactivated`] if the link is inactive, regardless of marker state
    /// - [`ResolveError::Store`] on any store failure
    pub async fn resolve(
        &self,
        token: &str,
        visit: VisitContext<'_>,
    ) -> Result<Resolution, ResolveError> {
        if !TOKEN_SHAPE.is_match(token) {
            return Err(ResolveError::Malformed);
        }

        let link = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(ResolveError::NotFound)?;

        if !link.active {
            return Err(ResolveError::Deactivated);
        }

        let now = visit.now.unwrap_or_else(Utc::now);

        let (outcome, new_marker) = match self.visit_decision(token, &visit, now).await {
            VisitDecision::Skip(reason) => {
                debug!(token, ?reason, "Visit not counted");
                metrics::counter!("qrlink_scans_total", "outcome" => "skipped").increment(1);
                (ScanOutcome::NotCounted(reason), None)
            }
            VisitDecision::Fresh { issue_marker } => {
                let incremented = match self.repository.increment_scan_count(token).await {
                    Ok(Some(count)) => Ok(count),
                    Ok(None) => Err(ResolveError::NotFound),
                    Err(e) => Err(ResolveError::Store(e)),
                };

                // The ledger entry was written before the increment; drop it so
                // the client's next attempt is counted.
                if incremented.is_err()
                    && !issue_marker
                    && let Some(fingerprint) = visit.fingerprint
                    && let Err(e) = self.ledger.forget(token, fingerprint).await
                {
                    warn!(error = %e, token, "Failed to release visit ledger entry");
                }

                let scan_count = incremented?;

                debug!(token, scan_count, "Visit counted");
                metrics::counter!("qrlink_scans_total", "outcome" => "counted").increment(1);

                let marker =
                    issue_marker.then(|| VisitMarker::issue(now, self.settings.visit_window));
                (ScanOutcome::Counted { scan_count }, marker)
            }
        };

        Ok(Resolution {
            destination_url: link.destination_url,
            outcome,
            new_marker,
        })
    }

    async fn visit_decision(
        &self,
        token: &str,
        visit: &VisitContext<'_>,
        now: DateTime<Utc>,
    ) -> VisitDecision {
        if self.settings.dashboard_bypass && is_dashboard_referer(visit.referer, visit.base_url) {
            return VisitDecision::Skip(SkipReason::DashboardPreview);
        }

        if self.effective_dedup_mode() == DedupMode::Server
            && let Some(fingerprint) = visit.fingerprint
        {
            let window_secs = self.settings.visit_window.num_seconds().max(1) as u64;
            match self.ledger.record_visit(token, fingerprint, window_secs).await {
                Ok(true) => return VisitDecision::Fresh {
                    issue_marker: false,
                },
                Ok(false) => return VisitDecision::Skip(SkipReason::LedgerHit),
                Err(e) => {
                    warn!(error = %e, token, "Visit ledger failed, using cookie marker");
                }
            }
        }

        let marker_valid = visit
            .marker
            .and_then(VisitMarker::parse)
            .is_some_and(|marker| marker.is_valid_at(now));

        if marker_valid {
            VisitDecision::Skip(SkipReason::MarkerPresent)
        } else {
            VisitDecision::Fresh { issue_marker: true }
        }
    }
}

/// True when `referer` is a page under `{base_url}/dashboard`.
fn is_dashboard_referer(referer: Option<&str>, base_url: Option<&str>) -> bool {
    let (Some(referer), Some(base)) = (referer, base_url) else {
        return false;
    };
    let prefix = format!("{}/dashboard", base.trim_end_matches('/'));

    referer
        .strip_prefix(&prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

/// Logs a resolution failure at the level it deserves.
pub fn log_resolve_error(token: &str, err: &ResolveError) {
    match err {
        ResolveError::Store(e) => error!(token, error = %e, "Resolution failed"),
        other => debug!(token, reason = other.reason().as_str(), "Resolution refused"),
    }
}
