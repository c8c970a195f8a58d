//! yardwatch CLI
//!
//! Local execution entry point for the salvage yard watcher.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use yardwatch::{
    error::Result,
    models::Config,
    notify::WebhookNotifier,
    pipeline::{self, run_cycle},
    sources,
    store::{SeenStore, SqliteStore},
};

/// yardwatch - Salvage Yard Listing Watcher
#[derive(Parser, Debug)]
#[command(
    name = "yardwatch",
    version,
    about = "Watches salvage yard inventories for matching truck listings"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the seen-set database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the watcher loop (scheduled checks + retention sweep)
    Watch,

    /// Run a single check cycle and report the new-listing count
    Check,

    /// Show tracking status
    Status,

    /// Dump tracked listings as JSON
    Listings {
        /// Maximum number of rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete listings first seen more than the given number of days ago
    Purge {
        #[arg(long, default_value_t = 90)]
        days: i64,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(path) = cli.database {
        config.database.path = path.display().to_string();
    }

    match cli.command {
        Command::Watch => {
            config.validate()?;

            let store = SqliteStore::connect(&config.database.path).await?;
            let notifier = WebhookNotifier::new(&config.notifier)?;
            let sources = sources::build_sources(&config)?;

            log::info!("Database initialized at {}", config.database.path);

            // The channel stays open for the lifetime of the loop; the
            // chat-side command surface would hold the sender.
            let (_commands, receiver) = mpsc::channel(16);
            pipeline::run_watcher(&config, sources, &store, &notifier, receiver).await?;
        }

        Command::Check => {
            config.validate()?;

            let store = SqliteStore::connect(&config.database.path).await?;
            let notifier = WebhookNotifier::new(&config.notifier)?;
            let sources = sources::build_sources(&config)?;

            log::info!("Checking salvage yards for new listings...");
            let outcome = run_cycle(&sources, &store, &notifier, config.watcher.dry_run).await;

            if outcome.new_listings > 0 {
                log::info!("Found {} new listing(s)!", outcome.new_listings);
            } else {
                log::info!("No new listings found.");
            }
            if outcome.source_failures > 0 {
                log::warn!("{} source(s) failed this cycle", outcome.source_failures);
            }
        }

        Command::Status => {
            let store = SqliteStore::connect(&config.database.path).await?;

            log::info!("Total listings tracked: {}", store.count().await?);
            log::info!(
                "Check interval: {} minutes",
                config.watcher.poll_interval_minutes
            );
            log::info!("Target make: {}", config.search.make);
            log::info!("Target locations: {}", config.search.locations.join(", "));
            log::info!(
                "Year range: {}-{}",
                config.search.year_min,
                config.search.year_max
            );
            log::info!("Dry run: {}", config.watcher.dry_run);
        }

        Command::Listings { limit } => {
            let store = SqliteStore::connect(&config.database.path).await?;
            let rows = store.all().await?;

            let shown: Vec<_> = rows.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&shown)?);

            if rows.len() > shown.len() {
                log::info!("Showing {} of {} listings", shown.len(), rows.len());
            }
        }

        Command::Purge { days } => {
            let store = SqliteStore::connect(&config.database.path).await?;
            let removed = store.purge_older_than(days).await?;
            log::info!("Removed {} listing(s) older than {} days", removed, days);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            let sources = sources::build_sources(&config)?;
            log::info!("✓ Config OK ({} sources configured)", sources.len());
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
