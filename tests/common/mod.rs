#![allow(dead_code)]

use axum::extract::ConnectInfo;
use qrlink::application::services::auth_service::{ClientInfo, hash_password};
use qrlink::application::services::resolver::{DedupMode, ResolverSettings};
use async_trait::async_trait;
use qrlink::infrastructure::dedup::{LedgerResult, NullVisitLedger, VisitLedger};
use qrlink::state::{AppState, HttpSettings, StateOptions};
use sqlx::PgPool;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::Layer;

pub const TEST_PASSWORD: &str = "correct-horse";

pub async fn create_test_user(pool: &PgPool, username: &str) -> i64 {
    let password_hash = hash_password(TEST_PASSWORD).unwrap();

    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_link(
    pool: &PgPool,
    owner_id: i64,
    token: &str,
    url: &str,
    active: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO short_links (owner_id, token, name, destination_url, active) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(owner_id)
    .bind(token)
    .bind(format!("link {token}"))
    .bind(url)
    .bind(active)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn scan_count(pool: &PgPool, token: &str) -> i64 {
    sqlx::query_scalar("SELECT scan_count FROM short_links WHERE token = $1")
        .bind(token)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn test_options() -> StateOptions {
    StateOptions {
        http: HttpSettings {
            public_base_url: Some("http://qr.test".to_string()),
            fingerprint_secret: "test-fingerprint-secret".to_string(),
            behind_proxy: false,
        },
        signing_secret: "test-signing-secret".to_string(),
        token_length: 6,
        token_max_attempts: 5,
        resolver: ResolverSettings::default(),
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::from_pool(
        Arc::new(pool),
        Arc::new(NullVisitLedger::new()),
        test_options(),
    )
}

/// In-process visit ledger for server dedup mode without Redis.
#[derive(Default)]
pub struct MemoryVisitLedger {
    seen: Mutex<HashSet<(String, String)>>,
}

#[async_trait]
impl VisitLedger for MemoryVisitLedger {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn record_visit(&self, token: &str, fingerprint: &str, _window_secs: u64) -> LedgerResult<bool> {
        let mut seen = self.seen.lock().unwrap();
        Ok(seen.insert((token.to_string(), fingerprint.to_string())))
    }

    async fn forget(&self, token: &str, fingerprint: &str) -> LedgerResult<()> {
        let mut seen = self.seen.lock().unwrap();
        seen.remove(&(token.to_string(), fingerprint.to_string()));
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// State in server dedup mode backed by [`MemoryVisitLedger`].
pub fn create_server_dedup_state(pool: PgPool, behind_proxy: bool) -> AppState {
    let mut options = test_options();
    options.http.behind_proxy = behind_proxy;
    options.resolver.dedup_mode = DedupMode::Server;
    AppState::from_pool(
        Arc::new(pool),
        Arc::new(MemoryVisitLedger::default()),
        options,
    )
}

/// Opens a session for `username` and returns the raw session token.
pub async fn login_token(state: &AppState, username: &str) -> String {
    state
        .auth_service
        .login(
            &format!("{username}@example.com"),
            TEST_PASSWORD,
            ClientInfo {
                ip_address: Some("127.0.0.1".to_string()),
                user_agent: None,
            },
        )
        .await
        .unwrap()
        .token
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
