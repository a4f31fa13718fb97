//! Category repository
//!
//! Holds the tracked categories and the set of names in use. The name set is
//! derived from the categories and is never persisted; it is rebuilt whenever
//! categories are merged in from the remote store. Lock order is
//! `categories` then `used_names`.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryId, Money};

/// In-memory category collection with a unique-name index
#[derive(Debug, Default)]
pub struct CategoryRepository {
    categories: RwLock<HashMap<CategoryId, Category>>,
    used_names: RwLock<HashSet<String>>,
}

impl CategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        let categories = self.categories.read().map_err(LedgerError::poisoned)?;
        Ok(categories.get(&id).cloned())
    }

    pub fn contains(&self, id: CategoryId) -> LedgerResult<bool> {
        let categories = self.categories.read().map_err(LedgerError::poisoned)?;
        Ok(categories.contains_key(&id))
    }

    /// All categories, sorted by name
    pub fn get_all(&self) -> LedgerResult<Vec<Category>> {
        let categories = self.categories.read().map_err(LedgerError::poisoned)?;
        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    /// Find a category by exact (case-sensitive) name
    pub fn get_by_name(&self, name: &str) -> LedgerResult<Option<Category>> {
        let categories = self.categories.read().map_err(LedgerError::poisoned)?;
        Ok(categories.values().find(|c| c.name == name).cloned())
    }

    pub fn name_in_use(&self, name: &str) -> LedgerResult<bool> {
        let used_names = self.used_names.read().map_err(LedgerError::poisoned)?;
        Ok(used_names.contains(name))
    }

    /// Insert a brand-new category, claiming its name
    ///
    /// Fails with a duplicate-name error, changing nothing, if the name is
    /// taken. `sync` runs under the write lock after the name is claimed.
    pub fn insert(&self, category: Category, sync: impl FnOnce(&Category)) -> LedgerResult<()> {
        let mut categories = self.categories.write().map_err(LedgerError::poisoned)?;
        let mut used_names = self.used_names.write().map_err(LedgerError::poisoned)?;

        if used_names.contains(&category.name) {
            return Err(LedgerError::duplicate_name(category.name));
        }
        if categories.contains_key(&category.id) {
            return Err(LedgerError::Duplicate {
                entity_type: "Category",
                identifier: category.id.to_string(),
            });
        }

        sync(&category);
        used_names.insert(category.name.clone());
        categories.insert(category.id, category);
        Ok(())
    }

    /// Rename a category, swapping its entry in the name set
    ///
    /// Returns the name it had before. Renaming to the current name succeeds
    /// without touching anything and without calling `sync`.
    pub fn rename(
        &self,
        id: CategoryId,
        new_name: &str,
        sync: impl FnOnce(&Category),
    ) -> LedgerResult<String> {
        let mut categories = self.categories.write().map_err(LedgerError::poisoned)?;
        let mut used_names = self.used_names.write().map_err(LedgerError::poisoned)?;

        let category = categories
            .get_mut(&id)
            .ok_or_else(|| LedgerError::category_not_found(id))?;

        if category.name == new_name {
            return Ok(category.name.clone());
        }
        if used_names.contains(new_name) {
            return Err(LedgerError::duplicate_name(new_name));
        }

        let old_name = std::mem::replace(&mut category.name, new_name.to_string());
        used_names.remove(&old_name);
        used_names.insert(category.name.clone());
        sync(category);
        Ok(old_name)
    }

    /// Mutate one category under the write lock
    ///
    /// Anything `f` mirrors remotely leaves in the same order as the
    /// mutations themselves. `f` must not change the name.
    pub fn update<R>(
        &self,
        id: CategoryId,
        f: impl FnOnce(&mut Category) -> LedgerResult<R>,
    ) -> LedgerResult<R> {
        let mut categories = self.categories.write().map_err(LedgerError::poisoned)?;
        let category = categories
            .get_mut(&id)
            .ok_or_else(|| LedgerError::category_not_found(id))?;
        f(category)
    }

    /// Remove a category and release its name
    pub fn remove(&self, id: CategoryId, sync: impl FnOnce(&Category)) -> LedgerResult<Category> {
        let mut categories = self.categories.write().map_err(LedgerError::poisoned)?;
        let mut used_names = self.used_names.write().map_err(LedgerError::poisoned)?;

        let category = categories
            .remove(&id)
            .ok_or_else(|| LedgerError::category_not_found(id))?;

        // Another category may share the name if the remote data had duplicates
        if !categories.values().any(|c| c.name == category.name) {
            used_names.remove(&category.name);
        }
        sync(&category);
        Ok(category)
    }

    /// Sum the current amounts of the given categories
    ///
    /// Ids with no tracked category contribute nothing and are returned
    /// alongside the total. A sum that overflows is a validation error.
    pub fn sum_amounts(&self, ids: &[CategoryId]) -> LedgerResult<(Money, Vec<CategoryId>)> {
        let categories = self.categories.read().map_err(LedgerError::poisoned)?;
        let mut missing = Vec::new();
        let mut total = Money::zero();
        for id in ids {
            match categories.get(id) {
                Some(category) => {
                    total = total
                        .checked_add(category.current_amount)
                        .ok_or_else(|| LedgerError::amount_out_of_range("sum of categories"))?;
                }
                None => missing.push(*id),
            }
        }
        Ok((total, missing))
    }

    /// Insert or overwrite categories read from the remote store
    pub fn merge(&self, incoming: Vec<Category>) -> LedgerResult<()> {
        let mut categories = self.categories.write().map_err(LedgerError::poisoned)?;
        let mut used_names = self.used_names.write().map_err(LedgerError::poisoned)?;

        for category in incoming {
            categories.insert(category.id, category);
        }

        used_names.clear();
        used_names.extend(categories.values().map(|c| c.name.clone()));
        Ok(())
    }

    /// Count categories
    pub fn count(&self) -> LedgerResult<usize> {
        let categories = self.categories.read().map_err(LedgerError::poisoned)?;
        Ok(categories.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;

    fn category(id: i64, name: &str) -> Category {
        Category::new(CategoryId::new(id), name, None)
    }

    #[test]
    fn test_insert_claims_name() {
        let repo = CategoryRepository::new();
        repo.insert(category(1, "Food"), |_| {}).unwrap();

        assert!(repo.name_in_use("Food").unwrap());
        assert!(!repo.name_in_use("food").unwrap());
        assert_eq!(repo.get_by_name("Food").unwrap().unwrap().id, CategoryId::new(1));
    }

    #[test]
    fn test_duplicate_name_leaves_no_trace() {
        let repo = CategoryRepository::new();
        repo.insert(category(1, "Food"), |_| {}).unwrap();

        let mut synced = false;
        let err = repo.insert(category(2, "Food"), |_| synced = true).unwrap_err();
        assert!(err.is_duplicate_name());
        assert!(!synced);
        assert_eq!(repo.count().unwrap(), 1);
        assert!(repo.get(CategoryId::new(2)).unwrap().is_none());
    }

    #[test]
    fn test_rename_swaps_names() {
        let repo = CategoryRepository::new();
        repo.insert(category(1, "Food"), |_| {}).unwrap();

        let old = repo.rename(CategoryId::new(1), "Groceries", |_| {}).unwrap();
        assert_eq!(old, "Food");
        assert!(!repo.name_in_use("Food").unwrap());
        assert!(repo.name_in_use("Groceries").unwrap());
    }

    #[test]
    fn test_rename_to_same_name_is_silent() {
        let repo = CategoryRepository::new();
        repo.insert(category(1, "Food"), |_| {}).unwrap();

        let mut synced = false;
        repo.rename(CategoryId::new(1), "Food", |_| synced = true).unwrap();
        assert!(!synced);
        assert!(repo.name_in_use("Food").unwrap());
    }

    #[test]
    fn test_rename_to_taken_name_fails() {
        let repo = CategoryRepository::new();
        repo.insert(category(1, "Food"), |_| {}).unwrap();
        repo.insert(category(2, "Rent"), |_| {}).unwrap();

        let err = repo.rename(CategoryId::new(2), "Food", |_| {}).unwrap_err();
        assert!(err.is_duplicate_name());
        assert_eq!(repo.get(CategoryId::new(2)).unwrap().unwrap().name, "Rent");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let repo = CategoryRepository::new();
        let err = repo.update(CategoryId::new(9), |_| Ok(())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_releases_name() {
        let repo = CategoryRepository::new();
        repo.insert(category(1, "Food"), |_| {}).unwrap();
        repo.remove(CategoryId::new(1), |_| {}).unwrap();

        assert!(!repo.name_in_use("Food").unwrap());
        repo.insert(category(2, "Food"), |_| {}).unwrap();
    }

    #[test]
    fn test_sum_amounts_reports_missing() {
        let repo = CategoryRepository::new();
        let mut food = category(1, "Food");
        food.add_transaction(TransactionId::new(1), Money::from_cents(1500)).unwrap();
        let mut rent = category(2, "Rent");
        rent.add_transaction(TransactionId::new(2), Money::from_cents(-300)).unwrap();
        repo.merge(vec![food, rent]).unwrap();

        let (total, missing) = repo
            .sum_amounts(&[CategoryId::new(1), CategoryId::new(2), CategoryId::new(3)])
            .unwrap();
        assert_eq!(total, Money::from_cents(1200));
        assert_eq!(missing, vec![CategoryId::new(3)]);
    }

    #[test]
    fn test_merge_rebuilds_name_index() {
        let repo = CategoryRepository::new();
        repo.merge(vec![category(1, "Food"), category(2, "Rent")]).unwrap();
        assert!(repo.name_in_use("Food").unwrap());
        assert!(repo.name_in_use("Rent").unwrap());
        assert_eq!(repo.get_all().unwrap()[0].name, "Food");
    }
}
