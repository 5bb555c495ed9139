//! Line relay CLI configuration
//!
//! Settings come from, in increasing priority:
//! - built-in defaults
//! - a TOML file passed with `--config`
//! - command line flags (`--mode`, `--verbose`)

use std::path::Path;

use serde::{Deserialize, Serialize};
use linerelay_core::{PipelineConfig, TransformRegistry};

use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the CLI application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pipeline behavior
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of the loaded values
    pub fn with_overrides(mut self, mode: Option<usize>, verbose: bool) -> Result<Self> {
        if let Some(mode) = mode {
            self.pipeline.default_mode = mode;
        }
        if verbose {
            self.pipeline.verbose = true;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate against the built-in transform catalog
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate(&TransformRegistry::builtin())?;
        Ok(())
    }

    /// Example configuration file content
    pub fn example_config() -> Result<String> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml("[pipeline]\ndefault_mode = 2\n").unwrap();
        assert_eq!(config.pipeline.default_mode, 2);
        assert_eq!(config.pipeline.max_line_len, 1023);
        assert!(!config.pipeline.verbose);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml("[pipeline]\ndefault_mode = 12\n"),
            Err(CliError::Pipeline(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[pipeline]\ndefault_mode = \"upper\"\n"),
            Err(CliError::TomlParsing(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default().with_overrides(Some(5), true).unwrap();
        assert_eq!(config.pipeline.default_mode, 5);
        assert!(config.pipeline.verbose);

        assert!(AppConfig::default().with_overrides(Some(99), false).is_err());
    }

    #[test]
    fn test_example_config_round_trips() {
        let example = AppConfig::example_config().unwrap();
        assert!(example.contains("[pipeline]"));
        assert_eq!(AppConfig::from_toml(&example).unwrap(), AppConfig::default());
    }
}
