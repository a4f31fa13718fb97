//! Category aggregate manager
//!
//! Keeps each category's membership list and running amount in step and
//! guards the uniqueness of category names. Every change to a category's
//! amount is followed by a refresh of its budget's total.

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetId, Category, CategoryId, Money, TransactionId};
use crate::storage::Storage;
use crate::sync::mirror::FIELD_NAME;

use super::{skip_dangling, BudgetService, TransactionService};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a category, optionally inside a budget
    ///
    /// Names are compared exactly, case included. A taken name fails with a
    /// duplicate-name error and leaves nothing behind.
    pub fn create(&self, name: &str, budget_id: Option<BudgetId>) -> LedgerResult<Category> {
        let _cascade = self.storage.lock_cascade()?;

        let name = name.trim();
        Category::validate_name(name).map_err(|e| LedgerError::Validation(e.to_string()))?;

        if let Some(budget_id) = budget_id {
            if !self.storage.budgets.contains(budget_id)? {
                return Err(LedgerError::budget_not_found(budget_id));
            }
        }

        let category = Category::new(self.storage.ids().next_category_id(), name, budget_id);
        let mirror = self.storage.mirror();
        self.storage
            .categories
            .insert(category.clone(), |c| mirror.put_category(c))?;

        if let Some(budget_id) = budget_id {
            BudgetService::new(self.storage).category_added_locked(budget_id, category.id)?;
        }

        self.storage.log_create(
            EntityType::Category,
            category.id,
            Some(category.name.clone()),
            &category,
        );
        tracing::info!(id = %category.id, name = %category.name, "category created");

        Ok(category)
    }

    /// Rename a category
    ///
    /// Renaming to the current name is a successful no-op. Only the name
    /// field is written remotely.
    pub fn rename(&self, id: CategoryId, new_name: &str) -> LedgerResult<Category> {
        let _cascade = self.storage.lock_cascade()?;

        let new_name = new_name.trim();
        Category::validate_name(new_name).map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mirror = self.storage.mirror();
        let old_name = self.storage.categories.rename(id, new_name, |c| {
            mirror.put_category_field(c.id, FIELD_NAME, &c.name)
        })?;
        let category = self.lookup(id)?;

        if old_name != category.name {
            let mut before = category.clone();
            before.name = old_name.clone();
            self.storage.log_update(
                EntityType::Category,
                id,
                Some(category.name.clone()),
                &before,
                &category,
                format!("name: {} -> {}", old_name, category.name),
            );
        }

        Ok(category)
    }

    /// Book a transaction's amount into a category
    ///
    /// Called by the ledger when a transaction is added; it does not check
    /// that the transaction exists.
    pub fn add_transaction(
        &self,
        category_id: CategoryId,
        transaction_id: TransactionId,
        amount: Money,
    ) -> LedgerResult<()> {
        let _cascade = self.storage.lock_cascade()?;
        self.add_transaction_locked(category_id, transaction_id, amount)
    }

    pub(crate) fn add_transaction_locked(
        &self,
        category_id: CategoryId,
        transaction_id: TransactionId,
        amount: Money,
    ) -> LedgerResult<()> {
        self.ensure_bookable_locked(category_id, amount)?;

        let mirror = self.storage.mirror();
        let budget_id = self.storage.categories.update(category_id, |category| {
            category
                .add_transaction(transaction_id, amount)
                .map_err(|e| LedgerError::Validation(e.to_string()))?;
            mirror.put_category_totals(category);
            Ok(category.budget_id)
        })?;
        tracing::debug!(category = %category_id, transaction = %transaction_id, %amount, "booked");

        BudgetService::new(self.storage).refresh_locked(budget_id)
    }

    /// Take a transaction's amount back out of a category
    ///
    /// Nothing changes unless the transaction is a member.
    pub fn remove_transaction(
        &self,
        category_id: CategoryId,
        transaction_id: TransactionId,
        amount: Money,
    ) -> LedgerResult<()> {
        let _cascade = self.storage.lock_cascade()?;
        self.remove_transaction_locked(category_id, transaction_id, amount)
    }

    pub(crate) fn remove_transaction_locked(
        &self,
        category_id: CategoryId,
        transaction_id: TransactionId,
        amount: Money,
    ) -> LedgerResult<()> {
        self.ensure_removable_locked(category_id, transaction_id, amount)?;

        let mirror = self.storage.mirror();
        let (removed, budget_id) = self.storage.categories.update(category_id, |category| {
            let removed = category
                .remove_transaction(transaction_id, amount)
                .map_err(|e| LedgerError::Validation(e.to_string()))?;
            if removed {
                mirror.put_category_totals(category);
            }
            Ok((removed, category.budget_id))
        })?;

        if !removed {
            tracing::debug!(category = %category_id, transaction = %transaction_id, "not a member");
            return Ok(());
        }

        BudgetService::new(self.storage).refresh_locked(budget_id)
    }

    /// Fail unless booking `amount` keeps the category and its budget in range
    pub(crate) fn ensure_bookable_locked(
        &self,
        category_id: CategoryId,
        amount: Money,
    ) -> LedgerResult<()> {
        self.ensure_in_range(category_id, |total| total.checked_add(amount))
    }

    /// Fail unless taking a member's `amount` out keeps every total in range
    pub(crate) fn ensure_removable_locked(
        &self,
        category_id: CategoryId,
        transaction_id: TransactionId,
        amount: Money,
    ) -> LedgerResult<()> {
        if !self.lookup(category_id)?.contains(transaction_id) {
            return Ok(());
        }
        self.ensure_in_range(category_id, |total| total.checked_sub(amount))
    }

    fn ensure_in_range(
        &self,
        category_id: CategoryId,
        shift: impl Fn(Money) -> Option<Money>,
    ) -> LedgerResult<()> {
        let category = self.lookup(category_id)?;
        if shift(category.current_amount).is_none() {
            return Err(LedgerError::amount_out_of_range(format!(
                "category '{}'",
                category.name
            )));
        }

        let budget = match category.budget_id {
            Some(budget_id) => self.storage.budgets.get(budget_id)?,
            None => None,
        };
        if let Some(budget) = budget {
            let (total, _) = self.storage.categories.sum_amounts(&budget.category_ids)?;
            if shift(total).is_none() {
                return Err(LedgerError::amount_out_of_range(format!(
                    "budget '{}'",
                    budget.name
                )));
            }
        }
        Ok(())
    }

    /// Delete a category along with every transaction booked against it
    ///
    /// Member transactions are removed from the ledger without touching the
    /// category; entries detached by an earlier reset go too. The category
    /// then leaves its budget, which is recomputed, and is removed locally
    /// and remotely.
    pub fn delete(&self, id: CategoryId) -> LedgerResult<Category> {
        let _cascade = self.storage.lock_cascade()?;

        let category = self.lookup(id)?;
        let ledger = TransactionService::new(self.storage);

        for transaction_id in &category.transaction_ids {
            skip_dangling(ledger.delete_locked(*transaction_id, false), "category member")?;
        }
        for transaction_id in self.storage.transactions.ids_by_category(id)? {
            ledger.delete_locked(transaction_id, false)?;
        }

        if let Some(budget_id) = category.budget_id {
            let removal = BudgetService::new(self.storage).category_removed_locked(budget_id, id);
            skip_dangling(removal, "category budget")?;
        }

        let mirror = self.storage.mirror();
        let category = self
            .storage
            .categories
            .remove(id, |c| mirror.delete_category(c.id))?;

        self.storage.log_delete(
            EntityType::Category,
            category.id,
            Some(category.name.clone()),
            &category,
        );
        tracing::info!(
            id = %category.id,
            name = %category.name,
            transactions = category.transaction_ids.len(),
            "category deleted"
        );

        Ok(category)
    }

    /// Start a fresh accumulation period
    ///
    /// Clears the membership and zeroes the amount. The transactions stay in
    /// the ledger as history.
    pub fn reset(&self, id: CategoryId) -> LedgerResult<Category> {
        let _cascade = self.storage.lock_cascade()?;

        let mirror = self.storage.mirror();
        let (before, after) = self.storage.categories.update(id, |category| {
            let before = category.clone();
            category.reset();
            mirror.put_category(category);
            Ok((before, category.clone()))
        })?;

        BudgetService::new(self.storage).refresh_locked(after.budget_id)?;

        self.storage.log_update(
            EntityType::Category,
            id,
            Some(after.name.clone()),
            &before,
            &after,
            format!(
                "reset: {} transactions, {} -> {}",
                before.transaction_ids.len(),
                before.current_amount,
                after.current_amount
            ),
        );

        Ok(after)
    }

    /// Get a category, failing if it is not tracked
    pub fn lookup(&self, id: CategoryId) -> LedgerResult<Category> {
        self.storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id))
    }

    pub fn find_by_name(&self, name: &str) -> LedgerResult<Option<Category>> {
        self.storage.categories.get_by_name(name)
    }

    /// Find a category by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Category>> {
        if let Some(category) = self.find_by_name(identifier)? {
            return Ok(Some(category));
        }
        match identifier.parse::<CategoryId>() {
            Ok(id) => self.storage.categories.get(id),
            Err(_) => Ok(None),
        }
    }

    /// List all categories, by name
    pub fn list(&self) -> LedgerResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.categories.count()
    }
}
