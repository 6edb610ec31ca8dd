//! PostgreSQL implementation of the short link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, OwnerSummary, ShortLink, ShortLinkPatch};
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;

const COLUMNS: &str =
    "id, owner_id, token, name, destination_url, active, scan_count, created_at, updated_at";

/// PostgreSQL repository for short links.
///
/// Every statement is a single round-trip; there are no read-modify-write
/// sequences, so the toggle and the scan counter are safe under concurrency.
pub struct PgShortLinkRepository {
    pool: Arc<PgPool>,
}

impl PgShortLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortLinkRepository for PgShortLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            INSERT INTO short_links (owner_id, token, name, destination_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new_link.owner_id)
        .bind(&new_link.token)
        .bind(&new_link.name)
        .bind(&new_link.destination_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            "SELECT {COLUMNS} FROM short_links WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn token_exists(&self, token: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_links WHERE token = $1)")
                .bind(token)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            "SELECT {COLUMNS} FROM short_links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ShortLink>, AppError> {
        let links = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM short_links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn update(
        &self,
        id: i64,
        patch: ShortLinkPatch,
    ) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            UPDATE short_links
            SET name = $2, destination_url = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.destination_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn toggle_active(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        let link = sqlx::query_as::<_, ShortLink>(&format!(
            r#"
            UPDATE short_links
            SET active = NOT active, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_scan_count(&self, token: &str) -> Result<Option<i64>, AppError> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE short_links
            SET scan_count = scan_count + 1
            WHERE token = $1
            RETURNING scan_count
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn summary_for_owner(&self, owner_id: i64) -> Result<OwnerSummary, AppError> {
        let summary = sqlx::query_as::<_, OwnerSummary>(
            r#"
            SELECT
                COUNT(*)::bigint AS total_links,
                COUNT(*) FILTER (WHERE active)::bigint AS active_links,
                COALESCE(SUM(scan_count), 0)::bigint AS total_scans
            FROM short_links
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(summary)
    }
}
