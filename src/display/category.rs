//! Category display formatting

use std::collections::HashMap;

use tabled::Tabled;

use super::render_table;
use crate::models::{Budget, BudgetId, Category, Transaction};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Txns")]
    transactions: usize,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format categories as a table, naming each one's budget
pub fn format_category_list(
    categories: &[Category],
    budget_names: &HashMap<BudgetId, String>,
    currency: &str,
) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    let rows = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            budget: c
                .budget_id
                .map(|id| budget_names.get(&id).cloned().unwrap_or_else(|| id.to_string()))
                .unwrap_or_else(|| "-".to_string()),
            transactions: c.transaction_ids.len(),
            amount: c.current_amount.format_with_symbol(currency),
        })
        .collect();
    render_table(rows)
}

/// Format one category with its current members
pub fn format_category_details(
    category: &Category,
    budget: Option<&Budget>,
    members: &[Transaction],
    currency: &str,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:     {}\n", category.id));
    match budget {
        Some(budget) => output.push_str(&format!("  Budget: {}\n", budget.name)),
        None => output.push_str("  Budget: (none)\n"),
    }
    output.push_str(&format!(
        "  Amount: {}\n",
        category.current_amount.format_with_symbol(currency)
    ));
    output.push_str(&format!("  Transactions: {}\n", members.len()));
    for txn in members {
        output.push_str(&format!(
            "    {}  {:>12}  {}\n",
            txn.date,
            txn.amount.format_with_symbol(currency),
            txn.memo
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, LedgerDate, Money, TransactionId};

    #[test]
    fn test_list_names_budget() {
        let food = Category::new(CategoryId::new(1), "Food", Some(BudgetId::new(2)));
        let rent = Category::new(CategoryId::new(3), "Rent", None);
        let names = HashMap::from([(BudgetId::new(2), "Monthly".to_string())]);

        let output = format_category_list(&[food, rent], &names, "$");
        assert!(output.contains("Monthly"));
        assert!(output.contains("Rent"));
    }

    #[test]
    fn test_details() {
        let mut food = Category::new(CategoryId::new(1), "Food", None);
        food.add_transaction(TransactionId::new(7), Money::from_cents(-450)).unwrap();
        let txn = Transaction::new(
            TransactionId::new(7),
            food.id,
            LedgerDate::new(2023, 4, 1),
            Money::from_cents(-450),
        )
        .with_memo("lunch");

        let output = format_category_details(&food, None, &[txn], "$");
        assert!(output.contains("Budget: (none)"));
        assert!(output.contains("2023-04-01"));
        assert!(output.contains("lunch"));
    }
}
