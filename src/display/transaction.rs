//! Transaction display formatting

use std::collections::HashMap;

use tabled::Tabled;

use super::render_table;
use crate::models::{CategoryId, Money, Transaction};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Memo")]
    memo: String,
}

/// Format transactions as a table followed by their sum
pub fn format_transaction_list(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
    currency: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|t| TransactionRow {
            id: t.id.to_string(),
            date: t.date.to_string(),
            category: category_names
                .get(&t.category_id)
                .cloned()
                .unwrap_or_else(|| t.category_id.to_string()),
            amount: t.amount.format_with_symbol(currency),
            memo: t.memo.clone(),
        })
        .collect();

    let total: Money = transactions.iter().map(|t| t.amount).sum();
    format!(
        "{}{} transactions, total {}\n",
        render_table(rows),
        transactions.len(),
        total.format_with_symbol(currency)
    )
}
