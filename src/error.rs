//! Custom error types for the ledger core
//!
//! Every failure in the core is a local, recoverable condition returned to the
//! caller. Remote write failures never show up here; they are logged and
//! counted by the sync gateway instead.

use thiserror::Error;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors (ids, or category names)
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Local storage errors (poisoned locks)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A bulk read from the remote store failed
    #[error("Remote sync failure: {0}")]
    RemoteSyncFailure(String),
}

impl LedgerError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.to_string(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.to_string(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.to_string(),
        }
    }

    /// Create a duplicate-name error for categories
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Category",
            identifier: name.into(),
        }
    }

    /// Create a validation error for a total that no longer fits
    pub fn amount_out_of_range(what: impl std::fmt::Display) -> Self {
        Self::Validation(format!("Amount out of range: {}", what))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a duplicate category name
    pub fn is_duplicate_name(&self) -> bool {
        matches!(
            self,
            Self::Duplicate {
                entity_type: "Category",
                ..
            }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub(crate) fn poisoned(err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("Failed to acquire lock: {}", err))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
