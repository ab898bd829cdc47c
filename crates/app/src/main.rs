use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smsledger_storage::SqliteLedger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod notify;
mod source;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "smsledger")]
#[command(about = "Turns bank SMS alerts into a categorized ledger")]
struct Cli {
    /// Path to config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import transactions from an inbox export
    Sync {
        /// JSON array of {address, body, date} records
        #[arg(short, long)]
        input: PathBuf,
        /// Trailing window in days (overrides the config file)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Suggest merchants charged on a schedule
    Recurring {
        #[arg(long)]
        json: bool,
    },
    /// Manage rules that drop messages before parsing
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },
    /// Manage merchant to category rules
    CategoryRule {
        #[command(subcommand)]
        action: CategoryRuleAction,
    },
    /// List categories
    Categories,
    /// Manage amount alert tiers
    Tiers {
        #[command(subcommand)]
        action: TierAction,
    },
}

#[derive(Subcommand)]
enum IgnoreAction {
    List,
    Add {
        /// sender, keyword or regex
        kind: String,
        pattern: String,
    },
    Remove {
        id: i64,
    },
}

#[derive(Subcommand)]
enum CategoryRuleAction {
    Add {
        /// Substring of the merchant or message text
        pattern: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value_t = 0)]
        priority: i32,
    },
}

#[derive(Subcommand)]
enum TierAction {
    List,
    Set {
        key: String,
        #[arg(long)]
        label: Option<String>,
        /// Minimum amount in rupees, e.g. 5,000
        #[arg(long)]
        min: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (default_config, data_dir) = config::default_locations()?;
    let config_path = cli.config.unwrap_or(default_config);
    let config = AppConfig::load_or_default(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_deref().unwrap_or("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let db_path = config.resolve_database_path(&config_path, &data_dir);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let ledger = SqliteLedger::open(&db_path)
        .await
        .with_context(|| format!("Failed to open ledger at {}", db_path.display()))?;

    let output = match cli.command {
        Command::Sync { input, days } => {
            commands::sync(ledger, &config.sync, &input, days.unwrap_or(config.days_back)).await?
        }
        Command::Recurring { json } => commands::recurring(&ledger, &config.sync, json).await?,
        Command::Ignore { action } => match action {
            IgnoreAction::List => commands::list_ignore_rules(&ledger).await?,
            IgnoreAction::Add { kind, pattern } => {
                commands::add_ignore_rule(&ledger, &kind, &pattern).await?
            }
            IgnoreAction::Remove { id } => commands::remove_ignore_rule(&ledger, id).await?,
        },
        Command::CategoryRule { action } => match action {
            CategoryRuleAction::Add {
                pattern,
                category,
                priority,
            } => commands::add_category_rule(&ledger, &pattern, &category, priority).await?,
        },
        Command::Categories => commands::list_categories(&ledger).await?,
        Command::Tiers { action } => match action {
            TierAction::List => commands::list_tiers(&ledger).await?,
            TierAction::Set {
                key,
                label,
                min,
                enabled,
                sound,
            } => {
                commands::set_tier(
                    &ledger,
                    commands::TierUpdate {
                        key: &key,
                        label: label.as_deref(),
                        min_amount: min.as_deref(),
                        enabled,
                        sound,
                    },
                )
                .await?
            }
        },
    };

    println!("{}", output.trim_end());
    Ok(())
}
