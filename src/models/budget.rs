//! Budget model
//!
//! A budget groups categories and tracks their combined current amount.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId};
use super::money::Money;

/// A named group of categories with a derived total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: BudgetId,

    #[serde(default)]
    pub name: String,

    /// Member categories, in the order they joined
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,

    /// Sum of the member categories' current amounts as of the last recompute
    #[serde(default)]
    pub total: Money,
}

impl Budget {
    pub fn new(id: BudgetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category_ids: Vec::new(),
            total: Money::zero(),
        }
    }

    /// Add a category to the membership; returns `false` if already present
    pub fn attach(&mut self, category_id: CategoryId) -> bool {
        if self.category_ids.contains(&category_id) {
            return false;
        }
        self.category_ids.push(category_id);
        true
    }

    /// Drop a category from the membership; returns `false` if absent
    pub fn detach(&mut self, category_id: CategoryId) -> bool {
        let before = self.category_ids.len();
        self.category_ids.retain(|id| *id != category_id);
        self.category_ids.len() != before
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
