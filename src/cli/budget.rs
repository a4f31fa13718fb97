//! Budget CLI commands

use clap::Subcommand;

use super::resolve_budget;
use crate::config::Settings;
use crate::display::{format_budget_details, format_budget_list};
use crate::error::LedgerResult;
use crate::tracker::Tracker;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a new budget
    Create {
        /// Budget name
        name: String,
    },

    /// List all budgets with their totals
    List,

    /// Show a budget and its categories
    Show {
        /// Budget name or ID
        budget: String,
    },

    /// Delete a budget that has no categories left
    Delete {
        /// Budget name or ID
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    tracker: &Tracker,
    settings: &Settings,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    let service = tracker.budgets();
    let currency = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Create { name } => {
            let budget = service.create(&name)?;
            println!("Created budget: {}", budget.name);
            println!("  ID: {}", budget.id);
        }

        BudgetCommands::List => {
            print!("{}", format_budget_list(&service.list()?, currency));
        }

        BudgetCommands::Show { budget } => {
            let budget = resolve_budget(tracker, &budget)?;
            let categories = tracker.categories();
            let mut members = Vec::with_capacity(budget.category_ids.len());
            for id in &budget.category_ids {
                match categories.lookup(*id) {
                    Ok(category) => members.push(category),
                    Err(err) if err.is_not_found() => {}
                    Err(err) => return Err(err),
                }
            }
            print!("{}", format_budget_details(&budget, &members, currency));
        }

        BudgetCommands::Delete { budget } => {
            let budget = resolve_budget(tracker, &budget)?;
            service.delete(budget.id)?;
            println!("Deleted budget: {}", budget.name);
        }
    }

    Ok(())
}
