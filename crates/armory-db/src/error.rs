//! Database error types for armory-db.

use armory_batch::LoadError;
use armory_core::diff::DiffError;
use armory_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned undecodable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., an association asked of the wrong table).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input rejected before reaching storage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Before and after snapshots could not be compared.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// A request-scoped batch load failed.
    #[error(transparent)]
    Load(#[from] LoadError<DatabaseError>),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<CoreError> for DatabaseError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound { .. } => Self::NoResult,
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::Other(error) => Self::Other(error),
        }
    }
}
