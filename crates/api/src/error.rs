//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;
use workflows::{ValidationError, WorkflowError};

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Workflow error; carries the domain message.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Database error, for handlers that read storage directly.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Invalid request input.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Workflow(err) => (workflow_status(err), err.to_string()),
            ApiError::Database(err) => (database_status(err), err.to_string()),
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
        WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::InvalidTransition { .. }
        | WorkflowError::InsufficientBalance { .. }
        | WorkflowError::VoucherCollision => StatusCode::CONFLICT,
        WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn database_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
        DatabaseError::AlreadyExists { .. }
        | DatabaseError::InsufficientBalance { .. }
        | DatabaseError::StaleStatus { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
