use serde::{Deserialize, Serialize};

use super::defaults;
use super::score_config::invalid;
use crate::errors::ConfigError;

/// Instance-specific GFCI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientConfig {
    /// Sepset conditioning-set size cap. -1 is unlimited.
    pub max_degree: i32,
    /// Discriminating path length cap. -1 is unlimited, otherwise >= 4.
    pub max_path_length: i32,
    /// Apply R5-R10 after the R1-R4 fixpoint.
    pub complete_rule_set: bool,
}

impl Default for OrientConfig {
    fn default() -> Self {
        Self {
            max_degree: defaults::DEFAULT_MAX_DEGREE,
            max_path_length: defaults::DEFAULT_MAX_PATH_LENGTH,
            complete_rule_set: defaults::DEFAULT_COMPLETE_RULE_SET,
        }
    }
}

impl OrientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_degree < -1 {
            return Err(invalid("orient.max_degree", "must be -1 (unlimited) or >= 0"));
        }
        if self.max_path_length != -1
            && self.max_path_length < defaults::MIN_DISCRIMINATING_PATH_LENGTH
        {
            return Err(invalid(
                "orient.max_path_length",
                "must be -1 (unlimited) or >= 4",
            ));
        }
        Ok(())
    }

    /// Sepset depth as an optional cap.
    pub fn depth(&self) -> Option<usize> {
        usize::try_from(self.max_degree).ok()
    }

    /// Effective discriminating path length cap.
    pub fn path_length(&self) -> usize {
        usize::try_from(self.max_path_length).unwrap_or(defaults::UNBOUNDED_PATH_LENGTH)
    }
}
