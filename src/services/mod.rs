//! Service layer
//!
//! Each service is a thin borrow of the [`Storage`](crate::storage::Storage)
//! registry. Public mutating methods take the registry's cascade lock for the
//! whole operation; the `*_locked` variants assume it is already held and are
//! how the services call into each other during a cascade.

pub mod budget;
pub mod category;
pub mod transaction;

pub use budget::BudgetService;
pub use category::CategoryService;
pub use transaction::TransactionService;

use crate::error::{LedgerError, LedgerResult};

/// Treat `NotFound` on an id met mid-cascade as a skipped step
pub(crate) fn skip_dangling<T>(result: LedgerResult<T>, context: &str) -> LedgerResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ LedgerError::NotFound { .. }) => {
            tracing::warn!(error = %err, context, "skipping dangling reference");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
