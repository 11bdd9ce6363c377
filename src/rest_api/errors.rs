//! # REST API Errors
//!
//! Error types for the command endpoints and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::model::ValidationErrors;
use crate::repository::RepoError;

use super::response::{MessageResponse, ValidationProblem};

/// Body message for any 5xx; the cause is only logged
const INTERNAL_MESSAGE: &str = "internal server error";

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// No command with the requested id
    #[error("Resource not found")]
    NotFound,

    /// Create would duplicate `line` or `howTo`
    #[error("{0}")]
    Duplicate(String),

    /// Field validation failed
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// A repository call was handed a record it cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Store failure or broken internal expectation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::Duplicate(_) => StatusCode::BAD_REQUEST,
            RestError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RestError::InvalidArgument(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for RestError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(message) => RestError::Duplicate(message),
            RepoError::InvalidArgument(message) => RestError::InvalidArgument(message),
            RepoError::Store(message) => RestError::Internal(message),
        }
    }
}

impl From<ValidationErrors> for RestError {
    fn from(errors: ValidationErrors) -> Self {
        RestError::Validation(errors)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        match self {
            RestError::NotFound => status.into_response(),
            RestError::Duplicate(message) => {
                (status, Json(MessageResponse::new(message))).into_response()
            }
            RestError::Validation(errors) => {
                (status, Json(ValidationProblem::new(status, errors))).into_response()
            }
            RestError::InvalidArgument(_) | RestError::Internal(_) => {
                (status, Json(MessageResponse::new(INTERNAL_MESSAGE))).into_response()
            }
        }
    }
}
