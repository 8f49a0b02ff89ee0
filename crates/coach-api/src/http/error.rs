//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use coach_core::oracle::OracleError;
use coach_core::service::CoachError;
use coach_types::error::{DispatchError, RepositoryError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors raised by the coaching services.
    Coach(CoachError),
    /// Request validation failed before reaching a service.
    Validation(String),
}

impl From<CoachError> for AppError {
    fn from(e: CoachError) -> Self {
        AppError::Coach(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Coach(e) => match e {
                CoachError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoachError::UserNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "USER_NOT_FOUND",
                    format!("User '{id}' not found"),
                ),
                CoachError::Oracle(OracleError::Timeout(_)) => {
                    (StatusCode::BAD_GATEWAY, "ORACLE_TIMEOUT", e.to_string())
                }
                CoachError::Oracle(_) => (StatusCode::BAD_GATEWAY, "ORACLE_ERROR", e.to_string()),
                // The oracle produced actions that failed to validate.
                CoachError::Dispatch(DispatchError::Validation { .. })
                | CoachError::Dispatch(DispatchError::NotAnObject(_)) => {
                    (StatusCode::BAD_GATEWAY, "INVALID_ORACLE_RESPONSE", e.to_string())
                }
                CoachError::Dispatch(DispatchError::Repository(repo))
                | CoachError::Repository(repo) => repository_parts(repo),
            },
        }
    }
}

fn repository_parts(e: &RepositoryError) -> (StatusCode, &'static str, String) {
    match e {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            e.to_string(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(%status, code, %message, "request failed");
        } else {
            tracing::debug!(%status, code, %message, "request rejected");
        }
        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
