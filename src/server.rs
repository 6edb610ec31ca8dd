//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, visit ledger selection and the Axum
//! server lifecycle.

use crate::application::services::resolver::{DedupMode, ResolverSettings};
use crate::config::Config;
use crate::infrastructure::dedup::{NullVisitLedger, RedisVisitLedger, VisitLedger};
use crate::routes::app_router;
use crate::state::{AppState, HttpSettings, StateOptions};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Picks the visit ledger for the configured dedup mode.
///
/// Server mode without a reachable Redis falls back to the cookie marker.
async fn build_ledger(config: &Config) -> Arc<dyn VisitLedger> {
    if config.visit_dedup != DedupMode::Server {
        return Arc::new(NullVisitLedger::new());
    }

    let Some(redis_url) = &config.redis_url else {
        tracing::warn!("VISIT_DEDUP=server but Redis is not configured; using cookie markers");
        return Arc::new(NullVisitLedger::new());
    };

    match RedisVisitLedger::connect(redis_url).await {
        Ok(ledger) => {
            tracing::info!("Server-side visit dedup enabled (Redis)");
            Arc::new(ledger)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using cookie markers.", e);
            Arc::new(NullVisitLedger::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let ledger = build_ledger(&config).await;

    let state = AppState::from_pool(
        Arc::new(pool),
        ledger,
        StateOptions {
            http: HttpSettings {
                public_base_url: config.public_base_url.clone(),
                fingerprint_secret: config.session_signing_secret.clone(),
                behind_proxy: config.behind_proxy,
            },
            signing_secret: config.session_signing_secret.clone(),
            token_length: config.token_length,
            token_max_attempts: config.token_max_attempts,
            resolver: ResolverSettings {
                visit_window: chrono::Duration::seconds(config.visit_window_seconds as i64),
                dedup_mode: config.visit_dedup,
                dashboard_bypass: config.dashboard_bypass,
            },
        },
    );

    tracing::info!(
        dedup = state.resolver.effective_dedup_mode().as_str(),
        "Resolver ready"
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
