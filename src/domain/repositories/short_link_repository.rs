//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, OwnerSummary, ShortLink, ShortLinkPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_short_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepository: Send + Sync {
    /// Inserts a new link with `active = true` and `scan_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the token is already taken.
    /// Returns [`AppError::StoreUnavailable`] if the database is unreachable.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its public token.
    async fn find_by_token(&self, token: &str) -> Result<Option<ShortLink>, AppError>;

    /// Returns true if any link already uses `token`.
    async fn token_exists(&self, token: &str) -> Result<bool, AppError>;

    /// Finds a link by its database ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError>;

    /// Lists an owner's links, newest first.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ShortLink>, AppError>;

    /// Replaces the name and destination of a link.
    ///
    /// Returns `Ok(None)` if no link has this ID.
    async fn update(&self, id: i64, patch: ShortLinkPatch)
    -> Result<Option<ShortLink>, AppError>;

    /// Flips `active` in a single statement.
    ///
    /// Returns `Ok(None)` if no link has this ID.
    async fn toggle_active(&self, id: i64) -> Result<Option<ShortLink>, AppError>;

    /// Hard-deletes a link. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Atomically adds one to `scan_count` and returns the new value.
    ///
    /// Implemented as a single `UPDATE ... SET scan_count = scan_count + 1`
    /// so concurrent resolutions never lose increments.
    /// Returns `Ok(None)` if the token no longer exists.
    async fn increment_scan_count(&self, token: &str) -> Result<Option<i64>, AppError>;

    /// Aggregated totals for one owner.
    async fn summary_for_owner(&self, owner_id: i64) -> Result<OwnerSummary, AppError>;
}
