//! Transaction model
//!
//! A transaction is immutable once recorded: it is created, mirrored to the
//! remote store, and eventually deleted. Its amount feeds the running total of
//! the category it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::date::LedgerDate;
use super::ids::{CategoryId, TransactionId};
use super::money::Money;

/// A single signed money movement booked against a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier, supplied by the caller
    pub id: TransactionId,

    /// Amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// Category this transaction is booked against
    pub category_id: CategoryId,

    /// Booking date, flattened to `year`, `month`, `day` on the wire
    #[serde(flatten)]
    pub date: LedgerDate,

    #[serde(default)]
    pub memo: String,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        category_id: CategoryId,
        date: LedgerDate,
        amount: Money,
    ) -> Self {
        Self {
            id,
            amount,
            category_id,
            date,
            memo: String::new(),
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.date.is_valid() {
            return Err(TransactionValidationError::InvalidDate(self.date));
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.amount)?;
        if !self.memo.is_empty() {
            write!(f, " ({})", self.memo)?;
        }
        Ok(())
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionValidationError {
    #[error("{0} is not a calendar date")]
    InvalidDate(LedgerDate),
}
