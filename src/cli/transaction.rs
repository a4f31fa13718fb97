//! Transaction CLI commands

use clap::Subcommand;

use super::{category_names, resolve_category};
use crate::config::Settings;
use crate::display::format_transaction_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{LedgerDate, Money, Transaction, TransactionId};
use crate::tracker::Tracker;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction against a category
    Add {
        /// Category name or ID
        category: String,
        /// Amount, e.g. "20" or "-5.50" (negative for outflow)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Memo
        #[arg(short, long)]
        memo: Option<String>,
    },

    /// List transactions, oldest first
    List {
        /// Only transactions booked against this category
        #[arg(short, long)]
        category: Option<String>,
        /// Show only the most recent N
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a transaction and take it out of its category
    Delete {
        /// Transaction ID
        id: String,
    },

    /// List transactions dated within an inclusive range
    Range {
        /// First date (YYYY-MM-DD)
        from: String,
        /// Last date (YYYY-MM-DD)
        to: String,
    },
}

fn parse_date(value: &str) -> LedgerResult<LedgerDate> {
    value.parse().map_err(|_| {
        LedgerError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value))
    })
}

/// Handle a transaction command
pub fn handle_transaction_command(
    tracker: &Tracker,
    settings: &Settings,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = tracker.transactions();
    let currency = settings.currency_symbol.as_str();

    match cmd {
        TransactionCommands::Add {
            category,
            amount,
            date,
            memo,
        } => {
            let category = resolve_category(tracker, &category)?;
            let amount = Money::parse(&amount)
                .map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))?;
            let date = match date {
                Some(date) => parse_date(&date)?,
                None => LedgerDate::today(),
            };

            let mut txn = Transaction::new(service.next_id(), category.id, date, amount);
            if let Some(memo) = memo {
                txn = txn.with_memo(memo);
            }
            let txn = service.add(txn)?;

            println!(
                "Added {} to '{}' on {}",
                txn.amount.format_with_symbol(currency),
                category.name,
                txn.date
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List { category, limit } => {
            let mut transactions = match category {
                Some(category) => {
                    let category = resolve_category(tracker, &category)?;
                    service.list_by_category(category.id)?
                }
                None => service.list()?,
            };
            if let Some(limit) = limit {
                let start = transactions.len().saturating_sub(limit);
                transactions.drain(..start);
            }
            let names = category_names(tracker)?;
            print!("{}", format_transaction_list(&transactions, &names, currency));
        }

        TransactionCommands::Delete { id } => {
            let id: TransactionId = id
                .parse()
                .map_err(|_| LedgerError::transaction_not_found(&id))?;
            let txn = service.delete(id, true)?;
            println!(
                "Deleted transaction {} ({})",
                txn.id,
                txn.amount.format_with_symbol(currency)
            );
        }

        TransactionCommands::Range { from, to } => {
            let transactions = service.select_by_date_range(parse_date(&from)?, parse_date(&to)?)?;
            let names = category_names(tracker)?;
            print!("{}", format_transaction_list(&transactions, &names, currency));
        }
    }

    Ok(())
}
