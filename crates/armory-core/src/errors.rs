//! Cross-cutting error types for Armory.
//!
//! Domain-specific errors (`DatabaseError`, `LoadError`, `ConfigError`) live
//! in their respective crates. `DiffError` lives next to the diff engine.

use thiserror::Error;

/// Errors that can be raised by any Armory crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_kind} {id}")]
    NotFound { entity_kind: String, id: String },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Reject blank names before they reach storage.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `name` is empty after trimming.
    pub fn require_name(field: &str, name: &str) -> Result<(), Self> {
        if name.trim().is_empty() {
            return Err(Self::Validation(format!("{field} must not be blank")));
        }
        Ok(())
    }
}
