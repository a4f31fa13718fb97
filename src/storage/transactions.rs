//! Transaction repository
//!
//! Holds every known transaction plus an index from category to the
//! transactions booked against it.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CategoryId, Transaction, TransactionId};

/// In-memory transaction collection with a category index
#[derive(Debug, Default)]
pub struct TransactionRepository {
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        let data = self.data.read().map_err(LedgerError::poisoned)?;
        Ok(data.get(&id).cloned())
    }

    pub fn contains(&self, id: TransactionId) -> LedgerResult<bool> {
        let data = self.data.read().map_err(LedgerError::poisoned)?;
        Ok(data.contains_key(&id))
    }

    /// All transactions, oldest first
    pub fn get_all(&self) -> LedgerResult<Vec<Transaction>> {
        self.filter(|_| true)
    }

    /// Transactions matching `predicate`, ordered by date then id
    pub fn filter(
        &self,
        predicate: impl Fn(&Transaction) -> bool,
    ) -> LedgerResult<Vec<Transaction>> {
        let data = self.data.read().map_err(LedgerError::poisoned)?;
        let mut list: Vec<_> = data.values().filter(|t| predicate(t)).cloned().collect();
        list.sort_by_key(|t| (t.date, t.id));
        Ok(list)
    }

    /// Ids of every transaction booked against a category
    pub fn ids_by_category(&self, category_id: CategoryId) -> LedgerResult<Vec<TransactionId>> {
        let by_category = self.by_category.read().map_err(LedgerError::poisoned)?;
        Ok(by_category.get(&category_id).cloned().unwrap_or_default())
    }

    /// Insert a new transaction
    ///
    /// `sync` runs under the write lock once the id is known to be free, just
    /// before the transaction becomes visible.
    pub fn insert(&self, txn: Transaction, sync: impl FnOnce(&Transaction)) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(LedgerError::poisoned)?;
        let mut by_category = self.by_category.write().map_err(LedgerError::poisoned)?;

        if data.contains_key(&txn.id) {
            return Err(LedgerError::Duplicate {
                entity_type: "Transaction",
                identifier: txn.id.to_string(),
            });
        }

        sync(&txn);
        by_category.entry(txn.category_id).or_default().push(txn.id);
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Remove a transaction, running `sync` under the write lock if it existed
    pub fn remove(
        &self,
        id: TransactionId,
        sync: impl FnOnce(&Transaction),
    ) -> LedgerResult<Option<Transaction>> {
        let mut data = self.data.write().map_err(LedgerError::poisoned)?;
        let mut by_category = self.by_category.write().map_err(LedgerError::poisoned)?;

        let Some(txn) = data.remove(&id) else {
            return Ok(None);
        };

        sync(&txn);
        if let Some(ids) = by_category.get_mut(&txn.category_id) {
            ids.retain(|&tid| tid != id);
            if ids.is_empty() {
                by_category.remove(&txn.category_id);
            }
        }
        Ok(Some(txn))
    }

    /// Insert or overwrite transactions read from the remote store
    pub fn merge(&self, incoming: Vec<Transaction>) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(LedgerError::poisoned)?;
        let mut by_category = self.by_category.write().map_err(LedgerError::poisoned)?;

        for txn in incoming {
            data.insert(txn.id, txn);
        }

        by_category.clear();
        for txn in data.values() {
            by_category.entry(txn.category_id).or_default().push(txn.id);
        }
        for ids in by_category.values_mut() {
            ids.sort_unstable();
        }
        Ok(())
    }

    /// Count transactions
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(LedgerError::poisoned)?;
        Ok(data.len())
    }
}
