//! Repository trait for dashboard users.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Returns true if either the username or the email is already registered.
    async fn exists(&self, username: &str, email: &str) -> Result<bool, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Deletes a user and, by cascade, their sessions and links.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
