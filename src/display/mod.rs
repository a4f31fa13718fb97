//! Terminal output formatting
//!
//! Listings are rendered as tables; single records as indented key/value
//! blocks.

pub mod budget;
pub mod category;
pub mod transaction;

pub use budget::{format_budget_details, format_budget_list};
pub use category::{format_category_details, format_category_list};
pub use transaction::format_transaction_list;

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a table with the shared style
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    format!("{}\n", table)
}
