//! Workflow error types.

use database::models::ReportStatus;
use database::DatabaseError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by the workflow services.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The wallet cannot cover the requested debit.
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: i64, available: i64 },

    /// Request input failed validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The requested status change is not a legal step.
    #[error("cannot move report from {from} to {to}")]
    InvalidTransition { from: ReportStatus, to: ReportStatus },

    /// The actor is not allowed to perform this operation.
    #[error("{0}")]
    Forbidden(String),

    /// Every generated voucher code collided with an existing one.
    #[error("could not issue a unique voucher code, try again")]
    VoucherCollision,

    /// The persistence layer failed.
    #[error("storage failure: {0}")]
    Storage(#[source] DatabaseError),
}

impl From<DatabaseError> for WorkflowError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => WorkflowError::NotFound { entity, id },
            DatabaseError::InsufficientBalance {
                required, available, ..
            } => WorkflowError::InsufficientBalance {
                required,
                available,
            },
            other => WorkflowError::Storage(other),
        }
    }
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
