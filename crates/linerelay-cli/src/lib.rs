//! Line relay CLI library
//!
//! Argument parsing, configuration loading and the wiring between stdin,
//! Ctrl+C and the pipeline runtime.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod signals;

pub use cli::{Cli, Commands};
pub use commands::CommandDispatcher;
pub use config::AppConfig;
pub use error::{CliError, Result};
