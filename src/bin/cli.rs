//! Kindergarten vacancy watcher CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::time::Duration;

use barnehage_watch::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, CycleOutcome, DiffCalculator, Watcher},
    services::{HttpFetcher, platform_notifier},
    storage::{LocalStorage, SnapshotStore},
};
use clap::{Parser, Subcommand};

/// barnehage-watch - Kindergarten vacancy watcher
#[derive(Parser, Debug)]
#[command(
    name = "barnehage-watch",
    version,
    about = "Watches Oslo kindergarten vacancies for children under 3"
)]
struct Cli {
    /// Path to storage directory containing config and snapshot files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single check
    Check {
        /// Save the snapshot even if it looks truncated
        #[arg(long)]
        force: bool,
    },

    /// Check repeatedly at the configured interval
    Watch {
        /// Save snapshots even if they look truncated
        #[arg(long)]
        force: bool,

        /// Override the interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Write the website data file
    Publish {
        /// Output path, relative to the current directory
        /// (default: {storage_dir}/docs/data.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate,

    /// Show stored snapshot info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_watcher(config: &Config, storage: LocalStorage, force: bool) -> Result<Watcher> {
    let fetcher = HttpFetcher::new(&config.source)?;
    let notifier = platform_notifier(config.open_url());
    let watcher = Watcher::new(config, Box::new(fetcher), Box::new(storage), notifier)?;
    Ok(if force { watcher.force() } else { watcher })
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::with_config(&cli.storage_dir, &config.storage);

    match cli.command {
        Command::Check { force } => {
            config.validate()?;
            let watcher = build_watcher(&config, storage, force)?;
            match watcher.run_cycle().await {
                CycleOutcome::Skipped { reason } => {
                    return Err(AppError::fetch(&config.source.url, reason));
                }
                CycleOutcome::Changed {
                    persisted: false, ..
                } => log::warn!("Changes detected but snapshot was not saved"),
                _ => {}
            }
        }

        Command::Watch { force, interval } => {
            config.validate()?;
            let interval = Duration::from_secs(interval.unwrap_or(config.schedule.interval_secs));
            if interval.is_zero() {
                return Err(AppError::validation("interval must be > 0"));
            }
            let watcher = build_watcher(&config, storage, force)?;

            log::info!(
                "Watching {} every {}s",
                config.source.url,
                interval.as_secs()
            );
            pipeline::run_schedule(&watcher, interval).await;
        }

        Command::Publish { output } => {
            config.validate()?;
            let storage = match output {
                Some(path) => {
                    let path = std::path::absolute(&path)?;
                    storage.with_web_data_key(path.to_string_lossy())
                }
                None => storage,
            };
            let target = storage.web_data_path();
            let watcher = build_watcher(&config, storage, false)?;
            let data = pipeline::run_publish(&watcher).await?;
            log::info!(
                "Website data for {} districts saved to {} (lastUpdate {})",
                data.spots.district_count(),
                target.display(),
                data.last_update.to_rfc3339()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = if config_path.exists() {
                Config::load(&config_path).map_err(|e| {
                    AppError::config(format!("{}: {}", config_path.display(), e))
                })?
            } else {
                log::info!("No {} found, checking defaults", config_path.display());
                config
            };
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} districts, {} age markers)",
                config.rules.districts.len(),
                config.rules.age_markers.len()
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Source: {}", config.source.url);

            let snapshot_path = storage.snapshot_path();
            if !snapshot_path.exists() {
                log::info!("No snapshot found yet.");
                return Ok(());
            }

            let snapshot = storage.load().await?;
            log::info!(
                "Snapshot: {} spots in {} districts",
                snapshot.spot_count(),
                snapshot.district_count()
            );
            let order = DiffCalculator::new(&config.rules.districts);
            for district in order.ordered_districts(&snapshot) {
                let count = snapshot.get(district).map_or(0, |spots| spots.len());
                log::info!("    {}: {}", district, count);
            }
            if let Ok(Some(data)) = storage.load_web_data().await {
                log::info!("Website data last updated: {}", data.last_update);
            }
        }
    }

    Ok(())
}
