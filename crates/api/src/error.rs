use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hareline_core::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `hareline_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// WordPress session credentials missing, wrong or expired.
    #[error("Credentials invalid")]
    CredentialsInvalid,

    /// Static API token missing or wrong.
    #[error("API token validation failed")]
    TokenValidationFailed,

    /// A requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An upstream dependency (Listmonk) failed or is unreachable.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
            ),

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::CredentialsInvalid => (
                StatusCode::UNAUTHORIZED,
                "CREDENTIALS_INVALID",
                "Credentials invalid".to_string(),
            ),
            AppError::TokenValidationFailed => (
                StatusCode::FORBIDDEN,
                "TOKEN_INVALID",
                "API token validation failed".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Upstream(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_FAILED",
                msg.clone(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_422() {
        let response =
            AppError::Core(CoreError::Validation("bad filter".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_error_maps_to_503() {
        let response = AppError::Upstream("listmonk down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn token_failure_maps_to_403() {
        let response = AppError::TokenValidationFailed.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
