//! Budget display formatting

use tabled::Tabled;

use super::render_table;
use crate::models::{Budget, Category};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Categories")]
    categories: usize,
    #[tabled(rename = "Total")]
    total: String,
}

/// Format budgets as a table
pub fn format_budget_list(budgets: &[Budget], currency: &str) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let rows = budgets
        .iter()
        .map(|b| BudgetRow {
            id: b.id.to_string(),
            name: b.name.clone(),
            categories: b.category_ids.len(),
            total: b.total.format_with_symbol(currency),
        })
        .collect();
    render_table(rows)
}

/// Format one budget with its member categories
pub fn format_budget_details(budget: &Budget, members: &[Category], currency: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:    {}\n", budget.id));
    output.push_str(&format!("  Total: {}\n", budget.total.format_with_symbol(currency)));

    if members.is_empty() {
        output.push_str("  (no categories)\n");
        return output;
    }

    output.push_str("  Categories:\n");
    for category in members {
        output.push_str(&format!(
            "    {:<24} {:>12}\n",
            category.name,
            category.current_amount.format_with_symbol(currency)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetId, CategoryId, Money};

    #[test]
    fn test_empty_list() {
        assert_eq!(format_budget_list(&[], "$"), "No budgets found.\n");
    }

    #[test]
    fn test_list_shows_total() {
        let mut budget = Budget::new(BudgetId::new(4), "Monthly");
        budget.total = Money::from_cents(1500);
        let output = format_budget_list(&[budget], "$");
        assert!(output.contains("Monthly"));
        assert!(output.contains("$15.00"));
    }

    #[test]
    fn test_details_lists_members() {
        let budget = Budget::new(BudgetId::new(4), "Monthly");
        let food = Category::new(CategoryId::new(1), "Food", Some(budget.id));
        let output = format_budget_details(&budget, &[food], "$");
        assert!(output.contains("Budget: Monthly"));
        assert!(output.contains("Food"));
    }
}
