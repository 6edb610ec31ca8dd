//! Application error type and its HTTP mapping.
//!
//! Every mutation-path failure is rendered as
//! `{"error": {"code": ..., "message": ..., "details": ...}}`.
//! The public redirect path never renders these; it maps failures to a
//! reason code instead (see [`crate::application::services::resolver`]).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Deactivated { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// Destination URL rejected at create/update time.
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        Self::Validation {
            message: "Invalid destination URL".into(),
            details: json!({ "field": "url", "reason": reason.into() }),
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn deactivated(message: impl Into<String>, details: Value) -> Self {
        Self::Deactivated {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Deactivated { .. } => (StatusCode::GONE, "deactivated"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::StoreUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::Forbidden { message, details }
            | AppError::NotFound { message, details }
            | AppError::Deactivated { message, details }
            | AppError::Conflict { message, details }
            | AppError::StoreUnavailable { message, details }
            | AppError::Internal { message, details } => (message.clone(), details.clone()),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }

    /// Returns true when the error is a unique-constraint conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                tracing::error!(error = %e, "Database unreachable");
                AppError::store_unavailable("Record store unavailable", json!({}))
            }
            other => {
                tracing::error!(error = %other, "Database error");
                AppError::internal("Database error", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let field_errors = e.field_errors();
        let fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        AppError::bad_request(
            "Validation failed",
            json!({ "fields": fields, "reason": e.to_string() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::bad_request("x", json!({})), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("x", json!({})), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("x", json!({})), StatusCode::FORBIDDEN),
            (AppError::not_found("x", json!({})), StatusCode::NOT_FOUND),
            (AppError::deactivated("x", json!({})), StatusCode::GONE),
            (AppError::conflict("x", json!({})), StatusCode::CONFLICT),
            (
                AppError::store_unavailable("x", json!({})),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::internal("x", json!({})),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_and_code().0, status);
        }
    }

    #[test]
    fn test_invalid_destination_is_validation() {
        let err = AppError::invalid_destination("missing host");
        let info = err.to_error_info();

        assert_eq!(info.code, "validation_error");
        assert_eq!(info.details["field"], "url");
        assert_eq!(info.details["reason"], "missing host");
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::not_found("Short link not found", json!({ "id": 5 }));
        assert_eq!(err.to_string(), "Short link not found");
    }

    #[test]
    fn test_pool_timeout_maps_to_store_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_validation_errors_list_fields() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("name", validator::ValidationError::new("length"));

        let err: AppError = errors.into();
        let info = err.to_error_info();

        assert_eq!(info.code, "validation_error");
        assert_eq!(info.details["fields"], json!(["name"]));
    }

    #[test]
    fn test_row_not_found_maps_to_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
