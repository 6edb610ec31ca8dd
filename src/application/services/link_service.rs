//! Owner-scoped short link management.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::services::token_minter::{MintError, TokenMinter};
use crate::domain::entities::{NewShortLink, OwnerContext, OwnerSummary, ShortLink, ShortLinkPatch};
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::validate_destination;

pub const MAX_NAME_LEN: usize = 100;

/// Default number of links shown on the dashboard overview.
pub const RECENT_LINKS_LIMIT: i64 = 5;

/// Service for creating and managing an owner's links.
///
/// Every operation takes an explicit [`OwnerContext`]. Mutations on a link
/// the caller does not own fail with [`AppError::Forbidden`].
pub struct LinkService<R: ShortLinkRepository> {
    repository: Arc<R>,
    minter: TokenMinter<R>,
}

impl<R: ShortLinkRepository> LinkService<R> {
    pub fn new(repository: Arc<R>, token_length: usize, max_attempts: usize) -> Self {
        let minter = TokenMinter::new(repository.clone(), token_length, max_attempts);
        Self { repository, minter }
    }

    pub fn minter(&self) -> &TokenMinter<R> {
        &self.minter
    }

    /// Creates a link with a freshly minted token.
    ///
    /// A unique violation on insert means another request claimed the same
    /// token between the check and the insert; the token is minted again,
    /// within the same attempt bound.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid name or destination.
    /// Returns [`AppError::Internal`] if no unique token could be minted.
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be reached.
    pub async fn create(
        &self,
        ctx: &OwnerContext,
        name: &str,
        url: &str,
    ) -> Result<ShortLink, AppError> {
        let name = validate_name(name)?;
        let destination_url =
            validate_destination(url).map_err(|e| AppError::invalid_destination(e.to_string()))?;

        let max_attempts = self.minter.max_attempts();
        for attempt in 1..=max_attempts {
            let token = self.minter.mint().await?;

            let new_link = NewShortLink {
                owner_id: ctx.user_id,
                token,
                name: name.clone(),
                destination_url: destination_url.clone(),
            };

            match self.repository.create(new_link).await {
                Ok(link) => {
                    info!(link_id = link.id, owner_id = ctx.user_id, token = %link.token, "Short link created");
                    return Ok(link);
                }
                Err(e) if e.is_conflict() => {
                    warn!(attempt, "Token claimed concurrently, minting again");
                }
                Err(e) => return Err(e),
            }
        }

        Err(MintError::Exhausted {
            attempts: max_attempts,
        }
        .into())
    }

    /// Returns one of the caller's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    /// Returns [`AppError::Forbidden`] if it belongs to someone else.
    pub async fn get(&self, ctx: &OwnerContext, id: i64) -> Result<ShortLink, AppError> {
        let link = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        ensure_owner(ctx, &link)?;
        Ok(link)
    }

    /// Lists the caller's links, newest first.
    pub async fn list(
        &self,
        ctx: &OwnerContext,
        limit: Option<i64>,
    ) -> Result<Vec<ShortLink>, AppError> {
        self.repository.list_by_owner(ctx.user_id, limit).await
    }

    /// Replaces name and destination. The token never changes.
    pub async fn update(
        &self,
        ctx: &OwnerContext,
        id: i64,
        name: &str,
        url: &str,
    ) -> Result<ShortLink, AppError> {
        let name = validate_name(name)?;
        let destination_url =
            validate_destination(url).map_err(|e| AppError::invalid_destination(e.to_string()))?;

        self.get(ctx, id).await?;

        let link = self
            .repository
            .update(
                id,
                ShortLinkPatch {
                    name,
                    destination_url,
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(link_id = id, owner_id = ctx.user_id, "Short link updated");
        Ok(link)
    }

    /// Flips the active flag and returns the updated link.
    pub async fn toggle_active(&self, ctx: &OwnerContext, id: i64) -> Result<ShortLink, AppError> {
        self.get(ctx, id).await?;

        let link = self
            .repository
            .toggle_active(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(link_id = id, active = link.active, "Short link toggled");
        Ok(link)
    }

    /// Permanently deletes a link.
    pub async fn delete(&self, ctx: &OwnerContext, id: i64) -> Result<(), AppError> {
        self.get(ctx, id).await?;

        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }

        info!(link_id = id, owner_id = ctx.user_id, "Short link deleted");
        Ok(())
    }

    /// Totals for the caller's dashboard.
    pub async fn summary(&self, ctx: &OwnerContext) -> Result<OwnerSummary, AppError> {
        self.repository.summary_for_owner(ctx.user_id).await
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(AppError::bad_request(
            "Invalid name",
            json!({ "field": "name", "reason": format!("must be 1 to {MAX_NAME_LEN} characters") }),
        ));
    }
    Ok(name.to_string())
}

fn ensure_owner(ctx: &OwnerContext, link: &ShortLink) -> Result<(), AppError> {
    if link.is_owned_by(ctx.user_id) {
        Ok(())
    } else {
        warn!(link_id = link.id, user_id = ctx.user_id, "Access to foreign link refused");
        Err(AppError::forbidden(
            "You do not own this link",
            json!({ "id": link.id }),
        ))
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Short link not found", json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::short_link::sample_link;
    use crate::domain::repositories::MockShortLinkRepository;

    fn owner(user_id: i64) -> OwnerContext {
        OwnerContext {
            user_id,
            username: format!("user{user_id}"),
        }
    }

    fn service(repo: MockShortLinkRepository) -> LinkService<MockShortLinkRepository> {
        LinkService::new(Arc::new(repo), 6, 10)
    }

    fn echo_create(new: NewShortLink) -> ShortLink {
        let mut link = sample_link(1, new.owner_id, &new.token, true);
        link.name = new.name;
        link.destination_url = new.destination_url;
        link
    }

    #[tokio::test]
    async fn test_create_success() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_token_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|new| {
                new.owner_id == 7
                    && new.name == "Menu"
                    && new.destination_url == "https://example.com/page"
                    && new.token.len() == 6
            })
            .times(1)
            .returning(|new| Ok(echo_create(new)));

        let link = service(repo)
            .create(&owner(7), " Menu ", "https://example.com/page")
            .await
            .unwrap();

        assert_eq!(link.destination_url, "https://example.com/page");
        assert!(link.active);
        assert_eq!(link.scan_count, 0);
    }

    #[tokio::test]
    async fn test_create_adds_scheme() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_token_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|new| new.destination_url == "https://example.com")
            .returning(|new| Ok(echo_create(new)));

        let link = service(repo)
            .create(&owner(7), "Site", "example.com")
            .await
            .unwrap();

        assert_eq!(link.destination_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_destination_without_minting() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_token_exists().times(0);
        repo.expect_create().times(0);

        let svc = service(repo);
        for url in ["", "javascript:alert(1)", "ftp://example.com/file", "http://"] {
            let err = svc.create(&owner(7), "Bad", url).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{url}");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_name() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_create().times(0);

        let svc = service(repo);
        let long = "n".repeat(MAX_NAME_LEN + 1);
        for name in ["", "   ", long.as_str()] {
            let err = svc
                .create(&owner(7), name, "https://example.com")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_create_retries_on_insert_conflict() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_token_exists().returning(|_| Ok(false));
        let mut calls = 0;
        repo.expect_create().times(2).returning(move |new| {
            calls += 1;
            if calls == 1 {
                Err(AppError::conflict("Unique constraint violation", json!({})))
            } else {
                Ok(echo_create(new))
            }
        });

        assert!(
            service(repo)
                .create(&owner(7), "Menu", "https://example.com")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_create_exhausted_is_internal() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_token_exists().returning(|_| Ok(true));
        repo.expect_create().times(0);

        let err = service(repo)
            .create(&owner(7), "Menu", "https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_get_foreign_link_forbidden() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(sample_link(id, 7, "Ab3xYz", true))));

        let err = service(repo).get(&owner(8), 1).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_mutations_on_foreign_link_do_not_touch_store() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(sample_link(id, 7, "Ab3xYz", true))));
        repo.expect_toggle_active().times(0);
        repo.expect_delete().times(0);
        repo.expect_update().times(0);

        let svc = service(repo);
        let intruder = owner(8);

        assert!(matches!(
            svc.toggle_active(&intruder, 1).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(matches!(
            svc.delete(&intruder, 1).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(matches!(
            svc.update(&intruder, 1, "x", "https://example.com")
                .await
                .unwrap_err(),
            AppError::Forbidden { .. }
        ));
    }

    #[tokio::test]
    async fn test_get_missing_link() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo).get(&owner(7), 99).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let active = Arc::new(AtomicBool::new(true));
        let mut repo = MockShortLinkRepository::new();
        let a = active.clone();
        repo.expect_find_by_id().returning(move |id| {
            Ok(Some(sample_link(id, 7, "Ab3xYz", a.load(Ordering::SeqCst))))
        });
        let a = active.clone();
        repo.expect_toggle_active().times(2).returning(move |id| {
            let now = !a.load(Ordering::SeqCst);
            a.store(now, Ordering::SeqCst);
            Ok(Some(sample_link(id, 7, "Ab3xYz", now)))
        });

        let svc = service(repo);
        let ctx = owner(7);

        assert!(!svc.toggle_active(&ctx, 1).await.unwrap().active);
        assert!(svc.toggle_active(&ctx, 1).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_update_keeps_token() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(sample_link(id, 7, "Ab3xYz", true))));
        repo.expect_update()
            .withf(|id, patch| *id == 1 && patch.destination_url == "https://example.org/new")
            .returning(|id, patch| {
                let mut link = sample_link(id, 7, "Ab3xYz", true);
                link.name = patch.name;
                link.destination_url = patch.destination_url;
                Ok(Some(link))
            });

        let link = service(repo)
            .update(&owner(7), 1, "Renamed", "https://example.org/new")
            .await
            .unwrap();

        assert_eq!(link.token, "Ab3xYz");
        assert_eq!(link.name, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_success() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(sample_link(id, 7, "Ab3xYz", true))));
        repo.expect_delete().times(1).returning(|_| Ok(true));

        assert!(service(repo).delete(&owner(7), 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let mut repo = MockShortLinkRepository::new();
        repo.expect_list_by_owner()
            .withf(|owner_id, limit| *owner_id == 7 && *limit == Some(RECENT_LINKS_LIMIT))
            .returning(|_, _| Ok(vec![sample_link(1, 7, "Ab3xYz", true)]));

        let links = service(repo)
            .list(&owner(7), Some(RECENT_LINKS_LIMIT))
            .await
            .unwrap();

        assert_eq!(links.len(), 1);
    }
}
