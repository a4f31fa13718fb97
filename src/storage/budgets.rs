//! Budget repository

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId};

/// In-memory budget collection
#[derive(Debug, Default)]
pub struct BudgetRepository {
    budgets: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        let budgets = self.budgets.read().map_err(LedgerError::poisoned)?;
        Ok(budgets.get(&id).cloned())
    }

    pub fn contains(&self, id: BudgetId) -> LedgerResult<bool> {
        let budgets = self.budgets.read().map_err(LedgerError::poisoned)?;
        Ok(budgets.contains_key(&id))
    }

    /// All budgets, sorted by name
    pub fn get_all(&self) -> LedgerResult<Vec<Budget>> {
        let budgets = self.budgets.read().map_err(LedgerError::poisoned)?;
        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    pub fn insert(&self, budget: Budget, sync: impl FnOnce(&Budget)) -> LedgerResult<()> {
        let mut budgets = self.budgets.write().map_err(LedgerError::poisoned)?;
        if budgets.contains_key(&budget.id) {
            return Err(LedgerError::Duplicate {
                entity_type: "Budget",
                identifier: budget.id.to_string(),
            });
        }
        sync(&budget);
        budgets.insert(budget.id, budget);
        Ok(())
    }

    /// Mutate one budget under the write lock
    ///
    /// `f` may take read locks on the category collection; budgets always
    /// come first in the lock order.
    pub fn update<R>(
        &self,
        id: BudgetId,
        f: impl FnOnce(&mut Budget) -> LedgerResult<R>,
    ) -> LedgerResult<R> {
        let mut budgets = self.budgets.write().map_err(LedgerError::poisoned)?;
        let budget = budgets
            .get_mut(&id)
            .ok_or_else(|| LedgerError::budget_not_found(id))?;
        f(budget)
    }

    /// Remove a budget if `allow` accepts it
    pub fn remove_if(
        &self,
        id: BudgetId,
        allow: impl FnOnce(&Budget) -> LedgerResult<()>,
        sync: impl FnOnce(&Budget),
    ) -> LedgerResult<Budget> {
        let mut budgets = self.budgets.write().map_err(LedgerError::poisoned)?;
        let budget = budgets
            .get(&id)
            .ok_or_else(|| LedgerError::budget_not_found(id))?;
        allow(budget)?;
        sync(budget);
        budgets
            .remove(&id)
            .ok_or_else(|| LedgerError::budget_not_found(id))
    }

    /// Insert or overwrite budgets read from the remote store
    pub fn merge(&self, incoming: Vec<Budget>) -> LedgerResult<()> {
        let mut budgets = self.budgets.write().map_err(LedgerError::poisoned)?;
        for budget in incoming {
            budgets.insert(budget.id, budget);
        }
        Ok(())
    }

    pub fn count(&self) -> LedgerResult<usize> {
        let budgets = self.budgets.read().map_err(LedgerError::poisoned)?;
        Ok(budgets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryId;

    #[test]
    fn test_insert_and_update() {
        let repo = BudgetRepository::new();
        repo.insert(Budget::new(BudgetId::new(1), "Monthly"), |_| {}).unwrap();

        repo.update(BudgetId::new(1), |b| {
            b.attach(CategoryId::new(7));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            repo.get(BudgetId::new(1)).unwrap().unwrap().category_ids,
            vec![CategoryId::new(7)]
        );
    }

    #[test]
    fn test_remove_if_refused() {
        let repo = BudgetRepository::new();
        repo.insert(Budget::new(BudgetId::new(1), "Monthly"), |_| {}).unwrap();

        let result = repo.remove_if(
            BudgetId::new(1),
            |_| Err(LedgerError::Validation("busy".into())),
            |_| {},
        );
        assert!(result.is_err());
        assert_eq!(repo.count().unwrap(), 1);

        repo.remove_if(BudgetId::new(1), |_| Ok(()), |_| {}).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_update_missing_budget() {
        let repo = BudgetRepository::new();
        assert!(repo.update(BudgetId::new(3), |_| Ok(())).unwrap_err().is_not_found());
    }
}
