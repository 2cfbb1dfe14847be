//! Unified error types for the inventory API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and persistence errors
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::validation::FieldErrors;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Duplicate resource: {0}")]
    AlreadyExists(String),

    #[error("Insufficient capacity: {0}")]
    InsufficientCapacity(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Another transaction changed the same rows first
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::Validation(errors)
    }
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The request body or parameters could not be parsed
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Domain(DomainError::Validation(errors))
    }
}

const UNEXPECTED: &str = "An unexpected error occurred";

/// Error response body for JSON responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut validation_errors = None;

        let (status, error, message) = match self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Resource not found", msg)
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, "Duplicate resource", msg)
            }
            AppError::Domain(DomainError::InsufficientCapacity(msg)) => {
                (StatusCode::BAD_REQUEST, "Insufficient capacity", msg)
            }
            AppError::Domain(DomainError::InvalidArgument(msg)) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", msg)
            }
            AppError::Domain(DomainError::InvalidState(msg)) => {
                (StatusCode::CONFLICT, "Invalid state", msg)
            }
            AppError::Domain(DomainError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "Conflict", msg)
            }
            AppError::Domain(DomainError::Validation(errors)) => {
                validation_errors = Some(errors);
                (
                    StatusCode::BAD_REQUEST,
                    "Validation failed",
                    "Input validation failed. Please check the errors.".to_string(),
                )
            }
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    UNEXPECTED.to_string(),
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    UNEXPECTED.to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            status: status.as_u16(),
            error: error.to_string(),
            message,
            validation_errors,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: AppError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn domain_errors_map_to_stable_statuses() {
        assert_eq!(
            status_of(DomainError::NotFound("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::AlreadyExists("x".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::InsufficientCapacity("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::InvalidArgument("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::InvalidState("x".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Conflict("x".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Validation(FieldErrors::new()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let response = AppError::from(DomainError::Database("password=hunter2".into()));
        assert_eq!(status_of(response), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::from(DomainError::Internal("boom".into()));
        assert_eq!(status_of(response), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::BadRequest("expected value at line 1".into());
        assert_eq!(status_of(response), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_error_body_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Warehouse name is required");

        let body = ErrorResponse {
            status: 400,
            error: "Validation failed".to_string(),
            message: "Input validation failed. Please check the errors.".to_string(),
            validation_errors: Some(errors),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(
            json["validationErrors"]["name"],
            "Warehouse name is required"
        );
    }

    #[test]
    fn domain_error_messages() {
        let err = DomainError::InvalidState("warehouse has items".into());
        assert_eq!(err.to_string(), "Invalid state: warehouse has items");
    }
}
