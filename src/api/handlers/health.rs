//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: all components healthy
/// - **503 Service Unavailable**: one or more components degraded
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "visit_ledger": { "status": "ok", "message": "Disabled (cookie markers)" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let visit_ledger = check_ledger(&state).await;

    let all_healthy = database.is_ok() && visit_ledger.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            visit_ledger,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool.as_ref())
        .await
    {
        Ok(_) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unreachable");
            CheckStatus::error("Database unreachable")
        }
    }
}

async fn check_ledger(state: &AppState) -> CheckStatus {
    if !state.ledger.is_enabled() {
        return CheckStatus::ok("Disabled (cookie markers)");
    }

    if state.ledger.health_check().await {
        CheckStatus::ok("Redis connected")
    } else {
        CheckStatus::error("Redis connection failed")
    }
}
