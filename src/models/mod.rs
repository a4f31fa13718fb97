//! Core data models
//!
//! Transactions, categories and budgets, the identifiers that key them, and
//! the value types (money, decomposed dates) they are built from.

pub mod budget;
pub mod category;
pub mod date;
pub mod ids;
pub mod money;
pub mod transaction;

pub use budget::Budget;
pub use category::{Category, CategoryValidationError};
pub use date::{DateRange, LedgerDate};
pub use ids::{BudgetId, CategoryId, Clock, IdAllocator, SystemClock, TransactionId};
pub use money::{Money, MoneyParseError};
pub use transaction::{Transaction, TransactionValidationError};
