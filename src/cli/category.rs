//! Category CLI commands

use clap::Subcommand;

use super::{budget_names, resolve_budget, resolve_category};
use crate::config::Settings;
use crate::display::{format_category_details, format_category_list};
use crate::error::LedgerResult;
use crate::tracker::Tracker;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Create {
        /// Category name (unique, case-sensitive)
        name: String,
        /// Budget name or ID to put the category in
        #[arg(short, long)]
        budget: Option<String>,
    },

    /// List all categories
    List,

    /// Show a category and its member transactions
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        new_name: String,
    },

    /// Move a category to another budget
    Move {
        /// Category name or ID
        category: String,
        /// Target budget name or ID
        #[arg(short, long, conflicts_with = "unbudgeted", required_unless_present = "unbudgeted")]
        to: Option<String>,
        /// Take the category out of its budget
        #[arg(long)]
        unbudgeted: bool,
    },

    /// Start a fresh period: clear members and zero the amount
    Reset {
        /// Category name or ID
        category: String,
    },

    /// Delete a category and every transaction booked against it
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    tracker: &Tracker,
    settings: &Settings,
    cmd: CategoryCommands,
) -> LedgerResult<()> {
    let service = tracker.categories();
    let currency = settings.currency_symbol.as_str();

    match cmd {
        CategoryCommands::Create { name, budget } => {
            let budget = budget
                .map(|b| resolve_budget(tracker, &b))
                .transpose()?;
            let category = service.create(&name, budget.as_ref().map(|b| b.id))?;

            println!("Created category: {}", category.name);
            if let Some(budget) = budget {
                println!("  Budget: {}", budget.name);
            }
            println!("  ID: {}", category.id);
        }

        CategoryCommands::List => {
            let names = budget_names(tracker)?;
            print!("{}", format_category_list(&service.list()?, &names, currency));
        }

        CategoryCommands::Show { category } => {
            let category = resolve_category(tracker, &category)?;
            let budget = match category.budget_id.map(|id| tracker.budgets().lookup(id)) {
                Some(Ok(budget)) => Some(budget),
                Some(Err(err)) if !err.is_not_found() => return Err(err),
                _ => None,
            };
            let members: Vec<_> = tracker
                .transactions()
                .list_by_category(category.id)?
                .into_iter()
                .filter(|t| category.contains(t.id))
                .collect();
            print!(
                "{}",
                format_category_details(&category, budget.as_ref(), &members, currency)
            );
        }

        CategoryCommands::Rename { category, new_name } => {
            let category = resolve_category(tracker, &category)?;
            let renamed = service.rename(category.id, &new_name)?;
            println!("Renamed '{}' to '{}'", category.name, renamed.name);
        }

        CategoryCommands::Move {
            category,
            to,
            unbudgeted: _,
        } => {
            let category = resolve_category(tracker, &category)?;
            let target = to.map(|b| resolve_budget(tracker, &b)).transpose()?;
            tracker
                .budgets()
                .reassign_category(category.id, target.as_ref().map(|b| b.id))?;

            match target {
                Some(budget) => println!("Moved '{}' to budget '{}'", category.name, budget.name),
                None => println!("Removed '{}' from its budget", category.name),
            }
        }

        CategoryCommands::Reset { category } => {
            let category = resolve_category(tracker, &category)?;
            let reset = service.reset(category.id)?;
            println!(
                "Reset '{}': {} transactions cleared, was {}",
                reset.name,
                category.transaction_ids.len(),
                category.current_amount.format_with_symbol(currency)
            );
        }

        CategoryCommands::Delete { category } => {
            let category = resolve_category(tracker, &category)?;
            let deleted = service.delete(category.id)?;
            println!(
                "Deleted category: {} ({} transactions removed)",
                deleted.name,
                deleted.transaction_ids.len()
            );
        }
    }

    Ok(())
}
