//! Engine error types.
//!
//! Only configuration problems escalate to the caller. Everything else
//! (empty candidate sets, loss-making pairs, zero denominators) degrades to
//! a smaller result set and never shows up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("{table}: required columns missing: {reason}")]
    MissingColumns { table: &'static str, reason: String },

    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BundleError {
    pub(crate) fn missing(table: &'static str, reason: impl Into<String>) -> Self {
        BundleError::MissingColumns {
            table,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BundleError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// True for the fatal "cannot resolve the input schema" class of errors.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BundleError::MissingColumns { .. } | BundleError::InvalidConfig { .. }
        )
    }
}

/// Result type alias for engine operations.
pub type BundleResult<T> = Result<T, BundleError>;
