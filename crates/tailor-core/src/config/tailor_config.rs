//! Top-level configuration aggregating all sub-configs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{OracleConfig, OrientConfig, ScoreConfig, SearchConfig};
use crate::errors::ConfigError;

/// Everything a pipeline run needs besides data, backbone and knowledge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TailorConfig {
    pub score: ScoreConfig,
    pub search: SearchConfig,
    pub orient: OrientConfig,
    pub oracle: OracleConfig,
}

impl TailorConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: TailorConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: TailorConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.score.validate()?;
        self.search.validate()?;
        self.orient.validate()?;
        self.oracle.validate()?;
        Ok(())
    }
}
