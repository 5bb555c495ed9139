//! Error types for the line relay pipeline
//!
//! Two tiers exist: resource failures during startup (`Spawn`, `Io`) are fatal,
//! while operator selection errors (`UnknownMode`, `InvalidStage`) are reported
//! and recovered from by the dispatch loop.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Failure reported by a transform while rewriting a line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("Transform {name} rejected input: {reason}")]
    Rejected { name: String, reason: String },
}

// ----------------------------------------------------------------------------
// Pipeline Error
// ----------------------------------------------------------------------------

/// Core error type shared by the pipeline crates
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown mode {mode} (expected 0-{max})")]
    UnknownMode { mode: usize, max: usize },

    #[error("Invalid stage number {stage} (expected 1-{count})")]
    InvalidStage { stage: usize, count: usize },

    #[error("Failed to spawn stage {stage}: {source}")]
    Spawn {
        stage: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl PipelineError {
    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        PipelineError::Config {
            reason: reason.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, PipelineError>;
pub type PipelineResult<T> = Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_keeps_source() {
        use std::error::Error as _;

        let spawn = PipelineError::Spawn {
            stage: 1,
            source: std::io::Error::other("no threads"),
        };
        assert_eq!(spawn.to_string(), "Failed to spawn stage 1: no threads");
        assert!(spawn.source().is_some());
    }

    #[test]
    fn test_config_error_constructor() {
        let err = PipelineError::config_error("max_line_len must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: max_line_len must be at least 1"
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PipelineError::InvalidStage { stage: 5, count: 2 };
        assert_eq!(err.to_string(), "Invalid stage number 5 (expected 1-2)");

        let err = PipelineError::UnknownMode { mode: 7, max: 6 };
        assert_eq!(err.to_string(), "Unknown mode 7 (expected 0-6)");
    }
}
