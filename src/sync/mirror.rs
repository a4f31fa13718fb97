//! Translation of local changes into remote writes
//!
//! Whole records are written on creation; later changes to a category or
//! budget write only the affected fields.

use std::sync::Arc;

use serde::Serialize;

use super::{
    RemotePath, SyncGateway, BUDGET_COLLECTION, CATEGORY_COLLECTION, TRANSACTION_COLLECTION,
};
use crate::models::{Budget, BudgetId, Category, CategoryId, Transaction, TransactionId};

pub const FIELD_NAME: &str = "name";
pub const FIELD_TRANSACTION_IDS: &str = "transactionIds";
pub const FIELD_CURRENT_AMOUNT: &str = "currentAmount";
pub const FIELD_BUDGET_ID: &str = "budgetId";
pub const FIELD_CATEGORY_IDS: &str = "categoryIds";
pub const FIELD_TOTAL: &str = "total";

/// Issues the remote writes that mirror each local mutation
#[derive(Clone)]
pub struct Mirror {
    gateway: Arc<dyn SyncGateway>,
    root: RemotePath,
}

impl Mirror {
    pub fn new(gateway: Arc<dyn SyncGateway>, user_id: &str) -> Self {
        Self {
            gateway,
            root: RemotePath::root(user_id),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn SyncGateway> {
        &self.gateway
    }

    /// Location of a whole collection, e.g. `alice/category`
    pub fn collection(&self, name: &str) -> RemotePath {
        self.root.child(name)
    }

    fn record(&self, collection: &str, id: i64) -> RemotePath {
        self.root.child(collection).child(id)
    }

    fn put<T: Serialize>(&self, path: RemotePath, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.gateway.put(&path, value),
            Err(err) => tracing::warn!(%path, error = %err, "could not encode remote value"),
        }
    }

    pub fn put_transaction(&self, txn: &Transaction) {
        self.put(self.record(TRANSACTION_COLLECTION, txn.id.value()), txn);
    }

    pub fn delete_transaction(&self, id: TransactionId) {
        self.gateway
            .delete(&self.record(TRANSACTION_COLLECTION, id.value()));
    }

    pub fn put_category(&self, category: &Category) {
        self.put(self.record(CATEGORY_COLLECTION, category.id.value()), category);
    }

    pub fn put_category_field(&self, id: CategoryId, field: &str, value: impl Serialize) {
        let path = self.record(CATEGORY_COLLECTION, id.value()).child(field);
        self.put(path, &value);
    }

    /// Write the membership list and running total together
    pub fn put_category_totals(&self, category: &Category) {
        self.put_category_field(category.id, FIELD_TRANSACTION_IDS, &category.transaction_ids);
        self.put_category_field(category.id, FIELD_CURRENT_AMOUNT, category.current_amount);
    }

    pub fn delete_category(&self, id: CategoryId) {
        self.gateway
            .delete(&self.record(CATEGORY_COLLECTION, id.value()));
    }

    pub fn put_budget(&self, budget: &Budget) {
        self.put(self.record(BUDGET_COLLECTION, budget.id.value()), budget);
    }

    pub fn put_budget_field(&self, id: BudgetId, field: &str, value: impl Serialize) {
        let path = self.record(BUDGET_COLLECTION, id.value()).child(field);
        self.put(path, &value);
    }

    pub fn delete_budget(&self, id: BudgetId) {
        self.gateway.delete(&self.record(BUDGET_COLLECTION, id.value()));
    }
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror").field("root", &self.root).finish()
    }
}
