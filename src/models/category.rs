//! Category model
//!
//! A category carries a running total of the transactions booked against it
//! together with the ordered list of those transactions. The two move in
//! lockstep: every change to the member list adjusts the total by the same
//! transaction's amount.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, TransactionId};
use super::money::Money;

/// Maximum length of a category name, in characters
pub const MAX_NAME_LEN: usize = 50;

/// A spending or income category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,

    /// Unique among tracked categories (case-sensitive)
    pub name: String,

    /// Sum of the amounts of `transaction_ids`
    #[serde(default)]
    pub current_amount: Money,

    /// Member transactions, in booking order
    #[serde(default)]
    pub transaction_ids: Vec<TransactionId>,

    /// Budget this category rolls up into, if any
    #[serde(default)]
    pub budget_id: Option<BudgetId>,
}

impl Category {
    /// Create an empty category
    pub fn new(id: CategoryId, name: impl Into<String>, budget_id: Option<BudgetId>) -> Self {
        Self {
            id,
            name: name.into(),
            current_amount: Money::zero(),
            transaction_ids: Vec::new(),
            budget_id,
        }
    }

    /// Book a transaction into this category
    ///
    /// Fails, changing nothing, if the total would leave the representable
    /// range.
    pub fn add_transaction(
        &mut self,
        transaction_id: TransactionId,
        amount: Money,
    ) -> Result<(), CategoryValidationError> {
        let total = self
            .current_amount
            .checked_add(amount)
            .ok_or(CategoryValidationError::AmountOutOfRange)?;
        self.transaction_ids.push(transaction_id);
        self.current_amount = total;
        Ok(())
    }

    /// Take a transaction out of this category
    ///
    /// Returns `Ok(false)`, leaving the total alone, if it was not a member.
    pub fn remove_transaction(
        &mut self,
        transaction_id: TransactionId,
        amount: Money,
    ) -> Result<bool, CategoryValidationError> {
        let Some(pos) = self.transaction_ids.iter().position(|id| *id == transaction_id) else {
            return Ok(false);
        };
        let total = self
            .current_amount
            .checked_sub(amount)
            .ok_or(CategoryValidationError::AmountOutOfRange)?;
        self.transaction_ids.remove(pos);
        self.current_amount = total;
        Ok(true)
    }

    /// Start a fresh accumulation period: no members, zero total
    pub fn reset(&mut self) {
        self.transaction_ids.clear();
        self.current_amount = Money::zero();
    }

    pub fn contains(&self, transaction_id: TransactionId) -> bool {
        self.transaction_ids.contains(&transaction_id)
    }

    /// Validate a proposed category name
    pub fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
        if name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(CategoryValidationError::NameTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    #[error("Category name cannot be empty")]
    EmptyName,
    #[error("Category name too long ({0} chars, max 50)")]
    NameTooLong(usize),
    #[error("Category amount out of range")]
    AmountOutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn food() -> Category {
        Category::new(CategoryId::new(1), "Food", Some(BudgetId::new(9)))
    }

    #[test]
    fn test_add_and_remove_keep_total_in_step() {
        let mut cat = food();
        cat.add_transaction(TransactionId::new(1), Money::from_cents(2000)).unwrap();
        cat.add_transaction(TransactionId::new(2), Money::from_cents(-500)).unwrap();
        assert_eq!(cat.current_amount, Money::from_cents(1500));
        assert_eq!(cat.transaction_ids, vec![TransactionId::new(1), TransactionId::new(2)]);

        assert!(cat.remove_transaction(TransactionId::new(1), Money::from_cents(2000)).unwrap());
        assert_eq!(cat.current_amount, Money::from_cents(-500));
        assert_eq!(cat.transaction_ids, vec![TransactionId::new(2)]);
    }

    #[test]
    fn test_remove_non_member_leaves_total() {
        let mut cat = food();
        cat.add_transaction(TransactionId::new(1), Money::from_cents(2000)).unwrap();
        assert!(!cat.remove_transaction(TransactionId::new(7), Money::from_cents(100)).unwrap());
        assert_eq!(cat.current_amount, Money::from_cents(2000));
    }

    #[test]
    fn test_overflowing_add_changes_nothing() {
        let mut cat = food();
        cat.add_transaction(TransactionId::new(1), Money::from_cents(i64::MAX)).unwrap();
        assert_eq!(
            cat.add_transaction(TransactionId::new(2), Money::from_cents(1)),
            Err(CategoryValidationError::AmountOutOfRange)
        );
        assert_eq!(cat.transaction_ids, vec![TransactionId::new(1)]);
        assert_eq!(cat.current_amount, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_reset_clears_members_and_total() {
        let mut cat = food();
        cat.add_transaction(TransactionId::new(1), Money::from_cents(2000)).unwrap();
        cat.reset();
        assert!(cat.transaction_ids.is_empty());
        assert!(cat.current_amount.is_zero());
        assert_eq!(cat.name, "Food");
        assert_eq!(cat.budget_id, Some(BudgetId::new(9)));
    }

    #[test]
    fn test_remote_layout() {
        let mut cat = food();
        cat.add_transaction(TransactionId::new(4), Money::from_cents(250)).unwrap();
        assert_eq!(
            serde_json::to_value(&cat).unwrap(),
            json!({
                "id": 1,
                "name": "Food",
                "currentAmount": 250,
                "transactionIds": [4],
                "budgetId": 9,
            })
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(Category::validate_name("Food").is_ok());
        assert_eq!(
            Category::validate_name("   "),
            Err(CategoryValidationError::EmptyName)
        );
        assert_eq!(
            Category::validate_name(&"x".repeat(51)),
            Err(CategoryValidationError::NameTooLong(51))
        );
    }
}
