//! Command handlers for the line relay CLI

use std::io::{self, Write};

use tracing::{info, warn};

use linerelay_core::TransformRegistry;
use linerelay_runtime::{DispatchLoop, PipelineBuilder};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;
use crate::signals::{listen_for_interrupts, ABORT_EXIT_CODE};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command() {
            Commands::Run => Self::handle_run_command(config).await,
            Commands::Modes => Self::handle_modes_command(),
            Commands::Config => Self::handle_config_command(),
        }
    }

    /// Run the interactive pipeline until stdin closes or Ctrl+C aborts
    async fn handle_run_command(config: AppConfig) -> Result<()> {
        let pipeline = PipelineBuilder::new()
            .with_config(config.pipeline)
            .build_and_start()?;

        let dispatch = DispatchLoop::new(pipeline);
        let bridge = dispatch.interrupt_bridge();

        // Reading stdin blocks, so the loop gets its own blocking thread
        let mut dispatch_task =
            tokio::task::spawn_blocking(move || dispatch.run(io::stdin().lock()));
        let mut interrupt_task = tokio::spawn(listen_for_interrupts(bridge));

        let pipeline = tokio::select! {
            result = &mut dispatch_task => result??,
            result = &mut interrupt_task => {
                // A listener that never registered is a startup failure
                result??;
                warn!("Interrupted during reconfiguration, exiting");
                // The blocked stdin read cannot be cancelled
                std::process::exit(ABORT_EXIT_CODE)
            }
        };

        interrupt_task.abort();
        tokio::task::spawn_blocking(move || pipeline.shutdown()).await?;
        info!("Input closed, pipeline drained");
        Ok(())
    }

    /// Print the transform catalog
    fn handle_modes_command() -> Result<()> {
        let registry = TransformRegistry::builtin();
        let mut stdout = io::stdout().lock();
        for (id, name) in registry.catalog() {
            writeln!(stdout, "{}) {}", id, name)?;
        }
        Ok(())
    }

    /// Print an example configuration file
    fn handle_config_command() -> Result<()> {
        print!("{}", AppConfig::example_config()?);
        Ok(())
    }
}
