//! Line relay CLI entry point

use clap::Parser;
use tracing::{error, info};

use linerelay_cli::{cli::Cli, commands::CommandDispatcher, config::AppConfig, error::Result};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration; the file may turn on verbose logging
    let config = load_configuration(&cli);

    // Initialize logging
    let verbose = match &config {
        Ok(config) => config.pipeline.verbose,
        Err(_) => cli.verbose,
    };
    setup_logging(verbose);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting with default mode {}", config.pipeline.default_mode);

    // Execute the command
    if let Err(e) = CommandDispatcher::execute(cli, config).await {
        error!("Command execution failed: {}", e);
        std::process::exit(1);
    }
}

/// Setup logging based on verbosity level
///
/// Logs go to stderr; stdout carries only prompts and stage traces.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(verbose)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Load configuration from file or use defaults, then apply flag overrides
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    let config = if let Some(config_path) = &cli.config {
        AppConfig::load_from_file(config_path)?
    } else {
        AppConfig::default()
    };

    config.with_overrides(cli.mode, cli.verbose)
}
