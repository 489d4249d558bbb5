use serde::{Deserialize, Serialize};

use super::defaults;
use super::score_config::invalid;
use crate::errors::ConfigError;

/// Instance-specific FGES settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum node degree. Unset uses `ceil(ln(max(2, N)))`, -1 is unlimited.
    pub max_degree: Option<i32>,
    /// Second pass covers noncolliders when true, otherwise it follows
    /// d-connection to allow unfaithful structures.
    pub faithfulness_assumed: bool,
    /// First step scores both directions and keeps the larger bump.
    pub symmetric_first_step: bool,
    /// Worker threads for bump computation. 0 uses the global rayon pool.
    pub parallelism: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_degree: defaults::DEFAULT_SEARCH_MAX_DEGREE,
            faithfulness_assumed: defaults::DEFAULT_FAITHFULNESS_ASSUMED,
            symmetric_first_step: defaults::DEFAULT_SYMMETRIC_FIRST_STEP,
            parallelism: defaults::DEFAULT_PARALLELISM,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_degree.is_some_and(|d| d < -1) {
            return Err(invalid("search.max_degree", "must be -1 (unlimited) or >= 0"));
        }
        Ok(())
    }

    /// Effective degree cap for `sample_size` training rows.
    pub fn degree_cap(&self, sample_size: usize) -> usize {
        match self.max_degree {
            None => default_degree_cap(sample_size),
            Some(d) => usize::try_from(d).unwrap_or(usize::MAX),
        }
    }
}

/// `ceil(ln(max(2, N)))`.
pub fn default_degree_cap(sample_size: usize) -> usize {
    (sample_size.max(2) as f64).ln().ceil() as usize
}
