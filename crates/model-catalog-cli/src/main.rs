//! Model Catalog CLI
//!
//! Main entry point for the `model-catalog` binary.
//! Loads configuration, sets up logging, opens the catalog and runs one
//! subcommand, printing its result as JSON.

mod commands;
mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use model_catalog_service::CatalogFacade;
use model_catalog_storage::BackendConfig;
use std::path::PathBuf;
use tracing::debug;

use commands::Command;
use config::CliConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development", global = true)]
    environment: String,

    /// Root directory of a file system catalog
    #[arg(long, env = "MODEL_CATALOG_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Prefix placed before every catalog key
    #[arg(long, global = true)]
    root_prefix: Option<String>,

    /// Log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = CliConfig::load(&args.config_dir, &args.environment)
        .context("Failed to load configuration")?;

    // Override with command-line arguments
    if let Some(root) = args.root {
        config.catalog.backend = BackendConfig::FileSystem { root };
    }
    if let Some(prefix) = args.root_prefix {
        config.catalog.root_prefix = Some(prefix);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    telemetry::init_with_config(telemetry::TelemetryConfig::from(&config.logging));
    debug!("Environment: {}", args.environment);
    debug!("Catalog: {:?}", config.catalog);

    let facade = CatalogFacade::from_config(&config.catalog)
        .await
        .context("Failed to open model catalog")?;

    let output = commands::run(&facade, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
