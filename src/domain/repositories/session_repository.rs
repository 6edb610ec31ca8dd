//! Repository trait for login sessions.

use crate::domain::entities::{NewSession, Session, User};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, new_session: NewSession) -> Result<Session, AppError>;

    /// Finds an unexpired session by token hash together with its user.
    async fn find_active(&self, token_hash: &str) -> Result<Option<(Session, User)>, AppError>;

    /// Deletes a session. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, token_hash: &str) -> Result<bool, AppError>;

    /// Removes expired sessions and returns how many were deleted.
    async fn purge_expired(&self) -> Result<u64, AppError>;
}
