//! Error types for ReConectaTec server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Where clients are sent when authentication is required
pub const LOGIN_URL: &str = "/api/v1/auth/login";

/// Machine-readable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NotFound = 5,
    BadValue = 6,
    Duplicate = 7,
    HasDependents = 8,
}

/// A group of records that prevent a deletion, e.g. "Donations"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DependentGroup {
    /// Record type label
    pub kind: String,
    /// Display labels of the dependent records
    pub records: Vec<String>,
}

/// Conflict reported by the deletion guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionConflict {
    pub message: String,
    pub dependents: Vec<DependentGroup>,
}

impl std::fmt::Display for DeletionConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Delete blocked: {0}")]
    DependentRecords(DeletionConflict),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Present on authentication failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    /// Present when a delete is blocked by dependent records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Vec<DependentGroup>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut login_url = None;
        let mut dependents = None;

        let (status, code, message) = match self {
            AppError::Authentication(msg) => {
                login_url = Some(LOGIN_URL.to_string());
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg)
            }
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg),
            AppError::DependentRecords(conflict) => {
                dependents = Some(conflict.dependents);
                (StatusCode::CONFLICT, ErrorCode::HasDependents, conflict.message)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            login_url,
            dependents,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_errors_point_to_login() {
        let response = AppError::Authentication("Missing authorization header".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn dependent_records_map_to_conflict() {
        let err = AppError::DependentRecords(DeletionConflict {
            message: "blocked".into(),
            dependents: vec![],
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = AppError::Validation("bad rut".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
