//! Database error types.

use thiserror::Error;

use crate::models::ReportStatus;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A debit was rejected because the wallet could not cover it
    #[error("insufficient balance for user {user_id}: need {required}, have {available}")]
    InsufficientBalance {
        user_id: String,
        required: i64,
        available: i64,
    },

    /// A status transition was rejected because the row no longer holds the
    /// status the caller observed
    #[error("report {id} is {actual}, expected {expected}")]
    StaleStatus {
        id: String,
        expected: ReportStatus,
        actual: ReportStatus,
    },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
