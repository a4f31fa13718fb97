use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use sanity::audit::AuditLogger;
use sanity::cli::{handle_budget_command, handle_category_command, handle_transaction_command};
use sanity::config::{SanityPaths, Settings};
use sanity::sync::{JsonFileStore, QueuedGateway};
use sanity::tracker::Tracker;

#[derive(Parser)]
#[command(
    name = "sanity",
    version,
    about = "Track transactions, categories and budgets from the command line",
    long_about = "Sanity keeps every category's running amount and every budget's \
                  total consistent with the transactions booked against them, and \
                  mirrors each change to a JSON snapshot of the remote store."
)]
struct Cli {
    /// Data directory (defaults to the platform config directory)
    #[arg(long, global = true, env = "SANITY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Budget management commands
    #[command(subcommand)]
    Budget(sanity::cli::BudgetCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(sanity::cli::CategoryCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(sanity::cli::TransactionCommands),

    /// Check every category amount and budget total
    Check,

    /// Rebuild category amounts and budget totals from their members
    Repair,

    /// Show recent entries from the audit log
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show configuration, or change one setting
    Config {
        /// Setting to change (user_id, log_level, currency_symbol, audit_enabled)
        key: Option<String>,
        /// New value
        #[arg(requires = "key")]
        value: Option<String>,
    },
}

fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("SANITY_LOG").unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => SanityPaths::with_base_dir(dir),
        None => SanityPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_level);

    let command = match cli.command {
        Some(Commands::Config { key, value }) => {
            return handle_config(&paths, &mut settings, key, value);
        }
        Some(command) => command,
        None => {
            println!("Sanity - transactions, categories and budgets kept consistent");
            println!();
            println!("Run 'sanity --help' for usage information.");
            return Ok(());
        }
    };

    paths.ensure_directories()?;
    let store = Arc::new(JsonFileStore::open(paths.remote_file())?);
    let (gateway, worker) = QueuedGateway::spawn(store);
    let gateway = Arc::new(gateway);

    let mut tracker = Tracker::new(gateway.clone(), &settings.user_id);
    if settings.audit_enabled {
        tracker = tracker.with_audit(AuditLogger::new(paths.audit_log()));
    }
    tracker
        .load()
        .await
        .context("Failed to load the remote snapshot")?;

    let outcome = run(&tracker, &settings, &paths, command);

    gateway.flush().await;
    let stats = tracker.sync_stats();
    if stats.writes_failed > 0 {
        eprintln!(
            "warning: {} of {} remote writes failed",
            stats.writes_failed,
            stats.writes_failed + stats.writes_applied
        );
    }

    drop(tracker);
    drop(gateway);
    worker.await.context("Sync worker panicked")?;

    outcome
}

fn run(
    tracker: &Tracker,
    settings: &Settings,
    paths: &SanityPaths,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Budget(cmd) => handle_budget_command(tracker, settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(tracker, settings, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(tracker, settings, cmd)?,
        Commands::Check => {
            let problems = tracker.verify()?;
            if problems.is_empty() {
                println!("All category amounts and budget totals are consistent.");
            } else {
                for problem in &problems {
                    println!("  {}", problem);
                }
                bail!(
                    "{} inconsistencies found; run 'sanity repair' to rebuild",
                    problems.len()
                );
            }
        }
        Commands::Repair => {
            let summary = tracker.recompute_all()?;
            if summary.is_clean() {
                println!("Nothing to repair.");
            } else {
                println!(
                    "Repaired {} categories and {} budgets",
                    summary.categories_fixed, summary.budgets_fixed
                );
                println!("  Dangling members dropped: {}", summary.members_dropped);
                println!("  Budget members added:     {}", summary.members_added);
            }
        }
        Commands::History { limit } => {
            let entries = AuditLogger::new(paths.audit_log()).read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Commands::Config { key, value } => handle_config(paths, &mut settings.clone(), key, value)?,
    }
    Ok(())
}

fn handle_config(
    paths: &SanityPaths,
    settings: &mut Settings,
    key: Option<String>,
    value: Option<String>,
) -> Result<()> {
    match (key, value) {
        (Some(key), Some(value)) => {
            settings.set(&key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value);
        }
        (Some(key), None) => bail!("Missing value for '{}'", key),
        _ => {
            println!("Sanity Configuration");
            println!("====================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Remote file:    {}", paths.remote_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  user_id:         {}", settings.user_id);
            println!("  log_level:       {}", settings.log_level);
            println!("  currency_symbol: {}", settings.currency_symbol);
            println!("  audit_enabled:   {}", settings.audit_enabled);
        }
    }
    Ok(())
}
