//! PostgreSQL implementation of the session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewSession, Session, User};
use crate::domain::repositories::SessionRepository;
use crate::error::AppError;

/// Joined session + user row.
#[derive(sqlx::FromRow)]
struct SessionUserRow {
    session_id: i64,
    user_id: i64,
    token_hash: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    session_created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    username: String,
    email: String,
    password_hash: String,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
}

impl From<SessionUserRow> for (Session, User) {
    fn from(r: SessionUserRow) -> Self {
        (
            Session {
                id: r.session_id,
                user_id: r.user_id,
                token_hash: r.token_hash,
                ip_address: r.ip_address,
                user_agent: r.user_agent,
                created_at: r.session_created_at,
                expires_at: r.expires_at,
            },
            User {
                id: r.user_id,
                username: r.username,
                email: r.email,
                password_hash: r.password_hash,
                created_at: r.user_created_at,
                updated_at: r.user_updated_at,
            },
        )
    }
}

pub struct PgSessionRepository {
    pool: Arc<PgPool>,
}

impl PgSessionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, new_session: NewSession) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, ip_address, user_agent, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token_hash, ip_address, user_agent, created_at, expires_at
            "#,
        )
        .bind(new_session.user_id)
        .bind(&new_session.token_hash)
        .bind(&new_session.ip_address)
        .bind(&new_session.user_agent)
        .bind(new_session.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    async fn find_active(&self, token_hash: &str) -> Result<Option<(Session, User)>, AppError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            r#"
            SELECT
                s.id AS session_id,
                s.user_id,
                s.token_hash,
                s.ip_address,
                s.user_agent,
                s.created_at AS session_created_at,
                s.expires_at,
                u.username,
                u.email,
                u.password_hash,
                u.created_at AS user_created_at,
                u.updated_at AS user_updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
