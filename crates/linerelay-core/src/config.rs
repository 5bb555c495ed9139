//! Pipeline configuration

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};
use crate::line::DEFAULT_MAX_LINE_LEN;
use crate::transform::{ModeId, TransformRegistry};

/// Number of worker stages in the pipeline
pub const STAGE_COUNT: usize = 2;

/// Pipeline behavior settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Mode every stage starts in
    pub default_mode: ModeId,

    /// Longest accepted input line in bytes; longer input is truncated
    pub max_line_len: usize,

    /// Enable debug logging
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_mode: 0,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            verbose: false,
        }
    }
}

impl PipelineConfig {
    /// Check the settings against the registry they will be used with
    pub fn validate(&self, registry: &TransformRegistry) -> Result<()> {
        if registry.is_empty() {
            return Err(PipelineError::config_error("Transform registry is empty"));
        }

        if self.default_mode >= registry.len() {
            return Err(PipelineError::config_error(format!(
                "Default mode {} is out of range (expected 0-{})",
                self.default_mode,
                registry.len() - 1
            )));
        }

        if self.max_line_len == 0 {
            return Err(PipelineError::config_error(
                "Maximum line length must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.default_mode, 0);
        assert_eq!(config.max_line_len, 1023);
        assert!(config.validate(&TransformRegistry::builtin()).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let registry = TransformRegistry::builtin();

        let mut config = PipelineConfig::default();
        config.default_mode = 7;
        assert!(config.validate(&registry).is_err());

        let mut config = PipelineConfig::default();
        config.max_line_len = 0;
        assert!(config.validate(&registry).is_err());

        assert!(PipelineConfig::default()
            .validate(&TransformRegistry::empty())
            .is_err());
    }
}
