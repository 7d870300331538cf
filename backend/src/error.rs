//! Application error handling
//!
//! One error type covers the whole layer, split along the failure
//! taxonomy the schema dictates:
//!
//! - integrity violations (unique / foreign-key / check / not-null) are
//!   deterministic caller bugs, reported with the violated constraint
//!   and never retried;
//! - not-found is distinct from an integrity violation;
//! - connectivity faults are infrastructure errors the caller may retry
//!   with backoff, never masked as data errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use menu_planner_shared::types::{ErrorDetail, ErrorResponse};
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

/// The kind of integrity rule a write violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

impl ViolationKind {
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::Unique => "UNIQUE_VIOLATION",
            ViolationKind::ForeignKey => "FOREIGN_KEY_VIOLATION",
            ViolationKind::Check => "CHECK_VIOLATION",
            ViolationKind::NotNull => "NOT_NULL_VIOLATION",
        }
    }
}

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Integrity violation ({})", kind.code())]
    Integrity {
        kind: ViolationKind,
        /// Name of the violated constraint, when the store reports one
        /// (e.g. `uq_meal_plans_user_year_month`)
        constraint: Option<String>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                ApiError::NotFound("Requested row does not exist".to_string())
            }
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().map(str::to_string);
                let kind = match db_err.kind() {
                    ErrorKind::UniqueViolation => Some(ViolationKind::Unique),
                    ErrorKind::ForeignKeyViolation => Some(ViolationKind::ForeignKey),
                    ErrorKind::CheckViolation => Some(ViolationKind::Check),
                    ErrorKind::NotNullViolation => Some(ViolationKind::NotNull),
                    _ => None,
                };
                match kind {
                    Some(kind) => ApiError::Integrity { kind, constraint },
                    None => ApiError::Internal(anyhow::Error::new(db_err)),
                }
            }
            sqlx::Error::Io(e) => ApiError::Unavailable(e.to_string()),
            sqlx::Error::Tls(e) => ApiError::Unavailable(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                ApiError::Unavailable("Connection pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => ApiError::Unavailable("Connection pool closed".to_string()),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, constraint) = match &self {
            ApiError::Integrity { kind, constraint } => {
                let status = match kind {
                    ViolationKind::Unique | ViolationKind::ForeignKey => StatusCode::CONFLICT,
                    ViolationKind::Check | ViolationKind::NotNull => StatusCode::BAD_REQUEST,
                };
                let message = match constraint {
                    Some(name) => format!("Write violates constraint '{name}'"),
                    None => "Write violates an integrity constraint".to_string(),
                };
                (status, kind.code(), message, constraint.clone())
            }
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Unavailable(msg) => {
                error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The data store is unreachable; retry with backoff".to_string(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                constraint,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_is_conflict() {
        let error = ApiError::Integrity {
            kind: ViolationKind::Unique,
            constraint: Some("uq_meal_plans_user_year_month".to_string()),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_check_violation_is_bad_request() {
        let error = ApiError::Integrity {
            kind: ViolationKind::Check,
            constraint: Some("ck_meal_plans_month".to_string()),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status() {
        let error = ApiError::NotFound("Meal plan not found".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_pool_timeout_is_retryable_unavailable() {
        let error = ApiError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, ApiError::Unavailable(_)));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_violation_codes_are_stable() {
        assert_eq!(ViolationKind::Unique.code(), "UNIQUE_VIOLATION");
        assert_eq!(ViolationKind::ForeignKey.code(), "FOREIGN_KEY_VIOLATION");
        assert_eq!(ViolationKind::Check.code(), "CHECK_VIOLATION");
        assert_eq!(ViolationKind::NotNull.code(), "NOT_NULL_VIOLATION");
    }
}
