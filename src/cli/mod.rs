//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Every handler works
//! on an already loaded [`Tracker`](crate::tracker::Tracker).

pub mod budget;
pub mod category;
pub mod transaction;

pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use std::collections::HashMap;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, Category, CategoryId};
use crate::tracker::Tracker;

/// Resolve a category by name or ID, failing if there is none
pub(crate) fn resolve_category(tracker: &Tracker, identifier: &str) -> LedgerResult<Category> {
    tracker
        .categories()
        .find(identifier)?
        .ok_or_else(|| LedgerError::category_not_found(identifier))
}

/// Resolve a budget by name or ID, failing if there is none
pub(crate) fn resolve_budget(tracker: &Tracker, identifier: &str) -> LedgerResult<Budget> {
    tracker
        .budgets()
        .find(identifier)?
        .ok_or_else(|| LedgerError::budget_not_found(identifier))
}

pub(crate) fn category_names(tracker: &Tracker) -> LedgerResult<HashMap<CategoryId, String>> {
    Ok(tracker
        .categories()
        .list()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

pub(crate) fn budget_names(tracker: &Tracker) -> LedgerResult<HashMap<BudgetId, String>> {
    Ok(tracker
        .budgets()
        .list()?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect())
}
