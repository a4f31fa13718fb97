//! Transaction ledger
//!
//! The entry and exit point for money movements. Adding a transaction books
//! it into its category, which in turn refreshes the category's budget;
//! deleting one can undo that booking or leave the category alone when the
//! category itself is being torn down.

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CategoryId, DateRange, LedgerDate, Transaction, TransactionId};
use crate::storage::Storage;

use super::{skip_dangling, CategoryService};

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// A fresh identifier for a transaction the caller is about to add
    pub fn next_id(&self) -> TransactionId {
        self.storage.ids().next_transaction_id()
    }

    /// Record a transaction and book it into its category
    ///
    /// The identifier is the caller's. Fails without changing anything if the
    /// date is not a real calendar day, the category is unknown, the id is
    /// already in the ledger, or a total would overflow.
    pub fn add(&self, txn: Transaction) -> LedgerResult<Transaction> {
        let _cascade = self.storage.lock_cascade()?;
        self.add_locked(txn)
    }

    pub(crate) fn add_locked(&self, txn: Transaction) -> LedgerResult<Transaction> {
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if !self.storage.categories.contains(txn.category_id)? {
            return Err(LedgerError::category_not_found(txn.category_id));
        }
        CategoryService::new(self.storage).ensure_bookable_locked(txn.category_id, txn.amount)?;

        let mirror = self.storage.mirror();
        self.storage
            .transactions
            .insert(txn.clone(), |t| mirror.put_transaction(t))?;
        self.storage.ids().observe(txn.id.value());

        CategoryService::new(self.storage).add_transaction_locked(
            txn.category_id,
            txn.id,
            txn.amount,
        )?;

        self.storage
            .log_create(EntityType::Transaction, txn.id, None, &txn);
        tracing::info!(
            id = %txn.id,
            category = %txn.category_id,
            amount = %txn.amount,
            "transaction added"
        );

        Ok(txn)
    }

    /// Remove a transaction from the ledger and the remote store
    ///
    /// With `cascade_to_category` the amount is also taken out of the owning
    /// category. Without it the category is left untouched, which is what
    /// category deletion wants.
    pub fn delete(
        &self,
        id: TransactionId,
        cascade_to_category: bool,
    ) -> LedgerResult<Transaction> {
        let _cascade = self.storage.lock_cascade()?;
        self.delete_locked(id, cascade_to_category)
    }

    pub(crate) fn delete_locked(
        &self,
        id: TransactionId,
        cascade_to_category: bool,
    ) -> LedgerResult<Transaction> {
        if cascade_to_category {
            if let Some(txn) = self.storage.transactions.get(id)? {
                let check = CategoryService::new(self.storage).ensure_removable_locked(
                    txn.category_id,
                    txn.id,
                    txn.amount,
                );
                skip_dangling(check, "transaction owner")?;
            }
        }

        let mirror = self.storage.mirror();
        let txn = self
            .storage
            .transactions
            .remove(id, |t| mirror.delete_transaction(t.id))?
            .ok_or_else(|| LedgerError::transaction_not_found(id))?;

        if cascade_to_category {
            let removal = CategoryService::new(self.storage).remove_transaction_locked(
                txn.category_id,
                txn.id,
                txn.amount,
            );
            skip_dangling(removal, "transaction owner")?;
        }

        self.storage
            .log_delete(EntityType::Transaction, txn.id, None, &txn);
        tracing::debug!(id = %txn.id, cascade_to_category, "transaction deleted");

        Ok(txn)
    }

    /// Transactions dated within `from..=to`, compared field by field
    ///
    /// A reversed or impossible range matches nothing.
    pub fn select_by_date_range(
        &self,
        from: LedgerDate,
        to: LedgerDate,
    ) -> LedgerResult<Vec<Transaction>> {
        let range = DateRange::new(from, to);
        if !range.is_usable() {
            tracing::debug!(%from, %to, "unusable date range");
            return Ok(Vec::new());
        }
        self.storage.transactions.filter(|t| range.contains(&t.date))
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> LedgerResult<Transaction> {
        self.storage
            .transactions
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id))
    }

    /// All transactions, oldest first
    pub fn list(&self) -> LedgerResult<Vec<Transaction>> {
        self.storage.transactions.get_all()
    }

    /// Every ledger entry booked against a category, members or not
    pub fn list_by_category(&self, category_id: CategoryId) -> LedgerResult<Vec<Transaction>> {
        self.storage
            .transactions
            .filter(|t| t.category_id == category_id)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.transactions.count()
    }
}
