//! # Response Formatting
//!
//! Error bodies returned by the command endpoints. Successful responses are
//! plain `CommandRead` items or arrays of them.

use axum::http::StatusCode;
use serde::Serialize;

use crate::model::ValidationErrors;

/// Title used on every validation problem body
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// `{ "message": ... }` body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Structured field validation failure
#[derive(Debug, Clone, Serialize)]
pub struct ValidationProblem {
    pub title: String,
    pub status: u16,
    pub errors: ValidationErrors,
}

impl ValidationProblem {
    pub fn new(status: StatusCode, errors: ValidationErrors) -> Self {
        Self {
            title: VALIDATION_TITLE.to_string(),
            status: status.as_u16(),
            errors,
        }
    }
}
