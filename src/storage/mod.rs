//! Entity registry
//!
//! The single owner of every tracked transaction, category and budget. Each
//! collection sits behind its own lock; operations that span aggregates
//! additionally hold the registry-wide cascade lock so that no other mutation
//! can interleave with them. Within a cascade, collection locks are taken in
//! the order budgets, categories, transactions.

pub mod budgets;
pub mod categories;
pub mod transactions;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use transactions::TransactionRepository;

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Clock, IdAllocator};
use crate::sync::{Mirror, SyncGateway};

/// Main registry that provides access to all repositories
pub struct Storage {
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    pub budgets: BudgetRepository,
    mirror: Mirror,
    ids: IdAllocator,
    cascade: Mutex<()>,
    audit: Option<AuditLogger>,
}

impl Storage {
    /// Create an empty registry mirroring into `user_id`'s namespace
    pub fn new(gateway: Arc<dyn SyncGateway>, user_id: &str) -> Self {
        Self::with_ids(gateway, user_id, IdAllocator::default())
    }

    /// Create an empty registry with a custom clock for id allocation
    pub fn with_clock(
        gateway: Arc<dyn SyncGateway>,
        user_id: &str,
        clock: impl Clock + 'static,
    ) -> Self {
        Self::with_ids(gateway, user_id, IdAllocator::new(clock))
    }

    fn with_ids(gateway: Arc<dyn SyncGateway>, user_id: &str, ids: IdAllocator) -> Self {
        Self {
            transactions: TransactionRepository::new(),
            categories: CategoryRepository::new(),
            budgets: BudgetRepository::new(),
            mirror: Mirror::new(gateway, user_id),
            ids,
            cascade: Mutex::new(()),
            audit: None,
        }
    }

    /// Record every change in an audit log
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Take the registry-wide lock held for the whole of any mutation
    pub fn lock_cascade(&self) -> LedgerResult<MutexGuard<'_, ()>> {
        self.cascade.lock().map_err(LedgerError::poisoned)
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        id: impl ToString,
        name: Option<String>,
        entity: &T,
    ) {
        self.log(|| AuditEntry::create(entity_type, id, name, entity));
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        id: impl ToString,
        name: Option<String>,
        before: &T,
        after: &T,
        summary: impl Into<String>,
    ) {
        self.log(|| AuditEntry::update(entity_type, id, name, before, after, summary));
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        id: impl ToString,
        name: Option<String>,
        entity: &T,
    ) {
        self.log(|| AuditEntry::delete(entity_type, id, name, entity));
    }

    fn log(&self, entry: impl FnOnce() -> AuditEntry) {
        let Some(logger) = &self.audit else {
            return;
        };
        let entry = entry();
        if let Err(err) = logger.log(&entry) {
            tracing::warn!(
                entity = %entry.entity_type,
                id = %entry.entity_id,
                error = %err,
                "failed to write audit entry"
            );
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("mirror", &self.mirror)
            .field("ids", &self.ids)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}
