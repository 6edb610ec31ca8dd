//! Dashboard user accounts and the explicit owner context.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered dashboard user.
///
/// `password_hash` is an Argon2id PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Authenticated identity passed explicitly into every owner operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    pub user_id: i64,
    pub username: String,
}

impl From<&User> for OwnerContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}
