//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Mode every stage starts in (see `modes`)
    #[arg(short, long, global = true)]
    pub mode: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Read lines from stdin and relay them through the stages (default)
    Run,
    /// List the available transform modes
    Modes,
    /// Print an example configuration file
    Config,
}

impl Cli {
    /// Subcommand to execute, defaulting to `run`
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}
