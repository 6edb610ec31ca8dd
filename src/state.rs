//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::resolver::ResolverSettings;
use crate::application::services::{AuthService, LinkService, PreviewService, Resolver};
use crate::infrastructure::dedup::VisitLedger;
use crate::infrastructure::persistence::{
    PgSessionRepository, PgShortLinkRepository, PgUserRepository,
};

pub type Links = LinkService<PgShortLinkRepository>;
pub type Auth = AuthService<PgUserRepository, PgSessionRepository>;

/// Request-independent HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Configured public base URL; `None` derives it from the `Host` header.
    pub public_base_url: Option<String>,
    /// Key for visit fingerprints in server dedup mode.
    pub fingerprint_secret: String,
    /// Trust forwarded client IP headers from a reverse proxy.
    pub behind_proxy: bool,
}

/// Construction parameters for [`AppState::from_pool`].
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub http: HttpSettings,
    pub signing_secret: String,
    pub token_length: usize,
    pub token_max_attempts: usize,
    pub resolver: ResolverSettings,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<PgPool>,
    pub link_service: Arc<Links>,
    pub resolver: Arc<Resolver<PgShortLinkRepository>>,
    pub auth_service: Arc<Auth>,
    pub preview_service: Arc<PreviewService<PgShortLinkRepository>>,
    pub ledger: Arc<dyn VisitLedger>,
    pub http: Arc<HttpSettings>,
}

impl AppState {
    /// Wires repositories and services over one connection pool.
    pub fn from_pool(pool: Arc<PgPool>, ledger: Arc<dyn VisitLedger>, options: StateOptions) -> Self {
        let link_repository = Arc::new(PgShortLinkRepository::new(pool.clone()));
        let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
        let session_repository = Arc::new(PgSessionRepository::new(pool.clone()));

        Self {
            link_service: Arc::new(LinkService::new(
                link_repository.clone(),
                options.token_length,
                options.token_max_attempts,
            )),
            resolver: Arc::new(Resolver::new(
                link_repository.clone(),
                ledger.clone(),
                options.resolver,
            )),
            auth_service: Arc::new(AuthService::new(
                user_repository,
                session_repository,
                options.signing_secret,
            )),
            preview_service: Arc::new(PreviewService::new(link_repository)),
            ledger,
            http: Arc::new(options.http),
            pool,
        }
    }
}
