//! # Telegram Warehouse CLI (`tgwh`)
//!
//! The `tgwh` binary drives every pipeline step and the analytical API.
//! Each step is independently triggerable; `tgwh pipeline` chains them in
//! their explicit dependency order.
//!
//! ## Usage
//!
//! ```bash
//! tgwh --config ./config/tgwh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tgwh init` | Create the raw schema and tables |
//! | `tgwh check` | Verify database connectivity |
//! | `tgwh scrape` | Scrape configured channels to dated JSON + images |
//! | `tgwh load-messages` | Load the JSON tree into `raw.telegram_messages` |
//! | `tgwh transform` | Run the external SQL-transformation tool |
//! | `tgwh detect` | Run object detection, write the detections CSV |
//! | `tgwh load-detections` | Load the CSV into `raw.image_detections` |
//! | `tgwh pipeline` | Run all steps in order |
//! | `tgwh stats` | Print raw-table statistics |
//! | `tgwh serve api` | Start the analytical HTTP API |
//!
//! Database and gateway credentials come from the environment
//! (`POSTGRES_*`, `TELEGRAM_*`); everything else from the config file.

mod config;
mod db;
mod detect;
mod load_detections;
mod load_raw;
mod migrate;
mod models;
mod pipeline;
mod queries;
mod scrape;
mod server;
mod stats;
mod telegram;
mod transform;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Telegram Warehouse CLI — scrape public channels, load a Postgres
/// warehouse, enrich images, and serve analytical reports.
#[derive(Parser)]
#[command(
    name = "tgwh",
    about = "Telegram Warehouse — channel scraping, warehousing, and analytics pipeline",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tgwh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the raw database schema.
    ///
    /// Creates the `raw` schema and the `telegram_messages` and
    /// `image_detections` tables. Idempotent — running it multiple times
    /// is safe.
    Init,

    /// Verify database connectivity and print the connected database name.
    Check,

    /// Scrape the configured channels.
    ///
    /// Fetches recent messages per channel through the gateway, downloads
    /// attached photos, and writes one JSON array per channel into the
    /// dated directory for today (UTC). A failing channel is logged and
    /// skipped.
    Scrape,

    /// Load scraped JSON files into `raw.telegram_messages`.
    ///
    /// One transaction per run, committed once after all files. Re-running
    /// loads duplicate rows; raw tables are append-only.
    LoadMessages,

    /// Run the external SQL-transformation tool.
    Transform {
        /// Only rebuild the named model (e.g. `fct_image_detections`).
        #[arg(long)]
        select: Option<String>,
    },

    /// Run object detection over the downloaded images.
    ///
    /// Writes one CSV row per detected object per image.
    Detect,

    /// Load the detections CSV into `raw.image_detections`.
    ///
    /// Creates the destination table if absent. Any malformed CSV row
    /// fails the run before anything is inserted.
    LoadDetections,

    /// Run the whole pipeline in order.
    ///
    /// scrape → load-messages → transform → detect → load-detections →
    /// transform of the detections model. Stops at the first failure.
    Pipeline,

    /// Print raw-table row counts and per-channel breakdowns.
    Stats,

    /// Start a server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the analytical HTTP API.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// four report endpoints plus `/health`.
    Api,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Check only needs the environment, not the config file.
    if let Commands::Check = cli.command {
        db::run_check().await?;
        return Ok(());
    }

    if let Commands::Stats = cli.command {
        stats::run_stats().await?;
        return Ok(());
    }

    if let Commands::Init = cli.command {
        migrate::run_migrations().await?;
        println!("Database initialized successfully.");
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init | Commands::Check | Commands::Stats => unreachable!(),
        Commands::Scrape => {
            scrape::run_scrape(&cfg).await?;
        }
        Commands::LoadMessages => {
            load_raw::run_load_messages(&cfg).await?;
        }
        Commands::Transform { select } => {
            transform::run_transform(&cfg, select.as_deref())?;
        }
        Commands::Detect => {
            detect::run_detect(&cfg)?;
        }
        Commands::LoadDetections => {
            load_detections::run_load_detections(&cfg).await?;
        }
        Commands::Pipeline => {
            pipeline::run_pipeline(&cfg).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Api => {
                server::run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}
