//! Budget aggregate manager
//!
//! A budget's total is the sum of its member categories' current amounts. It
//! is recomputed from the categories whenever one of them changes, joins or
//! leaves, while the budget's write lock is held.

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, CategoryId, Money};
use crate::storage::Storage;
use crate::sync::mirror::{FIELD_BUDGET_ID, FIELD_CATEGORY_IDS, FIELD_TOTAL};

use super::skip_dangling;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an empty budget
    pub fn create(&self, name: &str) -> LedgerResult<Budget> {
        let _cascade = self.storage.lock_cascade()?;

        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("Budget name cannot be empty".into()));
        }

        let budget = Budget::new(self.storage.ids().next_budget_id(), name);
        let mirror = self.storage.mirror();
        self.storage
            .budgets
            .insert(budget.clone(), |b| mirror.put_budget(b))?;

        self.storage
            .log_create(EntityType::Budget, budget.id, Some(budget.name.clone()), &budget);
        tracing::info!(id = %budget.id, name = %budget.name, "budget created");

        Ok(budget)
    }

    /// Sum the member categories' amounts into the budget's total
    pub fn recompute_total(&self, budget_id: BudgetId) -> LedgerResult<Money> {
        let _cascade = self.storage.lock_cascade()?;
        self.recompute_total_locked(budget_id)
    }

    pub(crate) fn recompute_total_locked(&self, budget_id: BudgetId) -> LedgerResult<Money> {
        self.storage
            .budgets
            .update(budget_id, |budget| self.apply_total(budget))
    }

    /// Recompute the budget a category rolls up into, if any
    ///
    /// A category pointing at a budget that no longer exists is logged and
    /// otherwise ignored.
    pub(crate) fn refresh_locked(&self, budget_id: Option<BudgetId>) -> LedgerResult<()> {
        if let Some(budget_id) = budget_id {
            skip_dangling(self.recompute_total_locked(budget_id), "category budget")?;
        }
        Ok(())
    }

    /// Drop a category from the budget's membership and recompute
    pub fn category_removed(
        &self,
        budget_id: BudgetId,
        category_id: CategoryId,
    ) -> LedgerResult<()> {
        let _cascade = self.storage.lock_cascade()?;
        self.category_removed_locked(budget_id, category_id)
    }

    pub(crate) fn category_removed_locked(
        &self,
        budget_id: BudgetId,
        category_id: CategoryId,
    ) -> LedgerResult<()> {
        let mirror = self.storage.mirror();
        self.storage.budgets.update(budget_id, |budget| {
            if budget.detach(category_id) {
                mirror.put_budget_field(budget.id, FIELD_CATEGORY_IDS, &budget.category_ids);
            }
            self.apply_total(budget)
        })?;
        tracing::debug!(budget = %budget_id, category = %category_id, "category left budget");
        Ok(())
    }

    /// Add a tracked category to the budget's membership and recompute
    ///
    /// The category must already name this budget as its own; use
    /// [`reassign_category`](Self::reassign_category) to move one.
    pub fn category_added(
        &self,
        budget_id: BudgetId,
        category_id: CategoryId,
    ) -> LedgerResult<()> {
        let _cascade = self.storage.lock_cascade()?;
        self.category_added_locked(budget_id, category_id)
    }

    pub(crate) fn category_added_locked(
        &self,
        budget_id: BudgetId,
        category_id: CategoryId,
    ) -> LedgerResult<()> {
        let category = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| LedgerError::category_not_found(category_id))?;
        if category.budget_id != Some(budget_id) {
            return Err(LedgerError::Validation(format!(
                "Category '{}' does not belong to budget {}",
                category.name, budget_id
            )));
        }

        let mirror = self.storage.mirror();
        self.storage.budgets.update(budget_id, |budget| {
            if budget.attach(category_id) {
                mirror.put_budget_field(budget.id, FIELD_CATEGORY_IDS, &budget.category_ids);
            }
            self.apply_total(budget)
        })?;
        tracing::debug!(
            budget = %budget_id,
            category = %category_id,
            "category joined budget"
        );
        Ok(())
    }

    /// Move a category to another budget, or out of budgets entirely
    pub fn reassign_category(
        &self,
        category_id: CategoryId,
        new_budget_id: Option<BudgetId>,
    ) -> LedgerResult<()> {
        let _cascade = self.storage.lock_cascade()?;

        let before = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| LedgerError::category_not_found(category_id))?;
        if before.budget_id == new_budget_id {
            return Ok(());
        }
        if let Some(budget_id) = new_budget_id {
            if !self.storage.budgets.contains(budget_id)? {
                return Err(LedgerError::budget_not_found(budget_id));
            }
        }

        let mirror = self.storage.mirror();
        let after = self.storage.categories.update(category_id, |category| {
            category.budget_id = new_budget_id;
            mirror.put_category_field(category.id, FIELD_BUDGET_ID, new_budget_id);
            Ok(category.clone())
        })?;

        if let Some(old) = before.budget_id {
            skip_dangling(self.category_removed_locked(old, category_id), "previous budget")?;
        }
        if let Some(new) = new_budget_id {
            self.category_added_locked(new, category_id)?;
        }

        let describe =
            |id: Option<BudgetId>| id.map_or_else(|| "none".to_string(), |id| id.to_string());
        self.storage.log_update(
            EntityType::Category,
            category_id,
            Some(after.name.clone()),
            &before,
            &after,
            format!(
                "budget: {} -> {}",
                describe(before.budget_id),
                describe(after.budget_id)
            ),
        );
        tracing::info!(category = %category_id, "category reassigned");

        Ok(())
    }

    /// Delete a budget that no longer owns any category
    pub fn delete(&self, budget_id: BudgetId) -> LedgerResult<Budget> {
        let _cascade = self.storage.lock_cascade()?;

        let mirror = self.storage.mirror();
        let budget = self.storage.budgets.remove_if(
            budget_id,
            |budget| {
                if budget.category_ids.is_empty() {
                    Ok(())
                } else {
                    Err(LedgerError::Validation(format!(
                        "Budget '{}' still has {} categories",
                        budget.name,
                        budget.category_ids.len()
                    )))
                }
            },
            |budget| mirror.delete_budget(budget.id),
        )?;

        self.storage
            .log_delete(EntityType::Budget, budget.id, Some(budget.name.clone()), &budget);
        tracing::info!(id = %budget.id, name = %budget.name, "budget deleted");

        Ok(budget)
    }

    /// Get a budget, failing if it is not tracked
    pub fn lookup(&self, id: BudgetId) -> LedgerResult<Budget> {
        self.storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id))
    }

    /// Find a budget by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Budget>> {
        let budgets = self.storage.budgets.get_all()?;
        if let Some(budget) = budgets.iter().find(|b| b.name == identifier) {
            return Ok(Some(budget.clone()));
        }
        match identifier.parse::<BudgetId>() {
            Ok(id) => Ok(budgets.into_iter().find(|b| b.id == id)),
            Err(_) => Ok(None),
        }
    }

    /// List all budgets, by name
    pub fn list(&self) -> LedgerResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    fn apply_total(&self, budget: &mut Budget) -> LedgerResult<Money> {
        let (total, missing) = self.storage.categories.sum_amounts(&budget.category_ids)?;
        for category_id in missing {
            tracing::warn!(
                budget = %budget.id,
                category = %category_id,
                "budget member is not tracked"
            );
        }
        budget.total = total;
        self.storage
            .mirror()
            .put_budget_field(budget.id, FIELD_TOTAL, total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LedgerDate, Transaction, TransactionId};
    use crate::services::{CategoryService, TransactionService};
    use crate::storage::testing::memory_storage;
    use crate::sync::RemotePath;
    use serde_json::json;

    fn add(storage: &Storage, id: i64, category: CategoryId, cents: i64) {
        TransactionService::new(storage)
            .add(Transaction::new(
                TransactionId::new(id),
                category,
                LedgerDate::new(2023, 3, 1),
                Money::from_cents(cents),
            ))
            .unwrap();
    }

    #[test]
    fn test_total_follows_member_categories() {
        let (storage, store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let categories = CategoryService::new(&storage);
        let budget = budgets.create("Monthly").unwrap();
        let food = categories.create("Food", Some(budget.id)).unwrap();
        let fun = categories.create("Fun", Some(budget.id)).unwrap();

        add(&storage, 1, food.id, 2000);
        add(&storage, 2, fun.id, 750);

        assert_eq!(budgets.lookup(budget.id).unwrap().total, Money::from_cents(2750));
        let path = RemotePath::parse(&format!("alice/budget/{}/total", budget.id));
        assert_eq!(store.get(&path), Some(json!(2750)));
    }

    #[test]
    fn test_category_removed_recomputes() {
        let (storage, _store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let categories = CategoryService::new(&storage);
        let budget = budgets.create("Monthly").unwrap();
        let food = categories.create("Food", Some(budget.id)).unwrap();
        add(&storage, 1, food.id, 2000);

        budgets.category_removed(budget.id, food.id).unwrap();
        let budget = budgets.lookup(budget.id).unwrap();
        assert!(budget.category_ids.is_empty());
        assert!(budget.total.is_zero());
    }

    #[test]
    fn test_reassign_moves_amount() {
        let (storage, store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let categories = CategoryService::new(&storage);
        let home = budgets.create("Home").unwrap();
        let travel = budgets.create("Travel").unwrap();
        let food = categories.create("Food", Some(home.id)).unwrap();
        add(&storage, 1, food.id, 2000);

        budgets.reassign_category(food.id, Some(travel.id)).unwrap();

        assert!(budgets.lookup(home.id).unwrap().total.is_zero());
        assert_eq!(budgets.lookup(travel.id).unwrap().total, Money::from_cents(2000));
        assert_eq!(categories.lookup(food.id).unwrap().budget_id, Some(travel.id));
        let path = RemotePath::parse(&format!("alice/category/{}/budgetId", food.id));
        assert_eq!(store.get(&path), Some(json!(travel.id.value())));

        budgets.reassign_category(food.id, None).unwrap();
        assert!(budgets.lookup(travel.id).unwrap().category_ids.is_empty());
        assert_eq!(categories.lookup(food.id).unwrap().budget_id, None);
    }

    #[test]
    fn test_category_added_requires_matching_owner() {
        let (storage, _store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let categories = CategoryService::new(&storage);
        let home = budgets.create("Home").unwrap();
        let travel = budgets.create("Travel").unwrap();
        let food = categories.create("Food", Some(home.id)).unwrap();

        let err = budgets.category_added(travel.id, food.id).unwrap_err();
        assert!(err.is_validation());
        assert!(budgets.lookup(travel.id).unwrap().category_ids.is_empty());

        // Re-adding to the owning budget is a no-op
        budgets.category_added(home.id, food.id).unwrap();
        assert_eq!(budgets.lookup(home.id).unwrap().category_ids, vec![food.id]);

        add(&storage, 1, food.id, 2000);
        categories.delete(food.id).unwrap();
        for budget in budgets.list().unwrap() {
            assert!(!budget.category_ids.contains(&food.id));
            assert!(budget.total.is_zero());
        }
    }

    #[test]
    fn test_reassign_to_missing_budget_changes_nothing() {
        let (storage, _store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let categories = CategoryService::new(&storage);
        let home = budgets.create("Home").unwrap();
        let food = categories.create("Food", Some(home.id)).unwrap();

        let err = budgets
            .reassign_category(food.id, Some(BudgetId::new(1)))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(categories.lookup(food.id).unwrap().budget_id, Some(home.id));
        assert_eq!(budgets.lookup(home.id).unwrap().category_ids, vec![food.id]);
    }

    #[test]
    fn test_delete_refuses_non_empty_budget() {
        let (storage, _store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let categories = CategoryService::new(&storage);
        let budget = budgets.create("Monthly").unwrap();
        let food = categories.create("Food", Some(budget.id)).unwrap();

        assert!(budgets.delete(budget.id).unwrap_err().is_validation());

        categories.delete(food.id).unwrap();
        budgets.delete(budget.id).unwrap();
        assert!(budgets.lookup(budget.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_recompute_missing_budget() {
        let (storage, _store) = memory_storage();
        let err = BudgetService::new(&storage)
            .recompute_total(BudgetId::new(3))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (storage, _store) = memory_storage();
        let budgets = BudgetService::new(&storage);
        let budget = budgets.create("Monthly").unwrap();
        assert_eq!(budgets.find("Monthly").unwrap().unwrap().id, budget.id);
        assert_eq!(budgets.find(&budget.id.to_string()).unwrap().unwrap().id, budget.id);
        assert!(budgets.find("Yearly").unwrap().is_none());
    }
}
