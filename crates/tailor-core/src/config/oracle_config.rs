use serde::{Deserialize, Serialize};

use super::defaults;
use super::score_config::invalid;
use crate::errors::ConfigError;

/// Order in which the instance-matching rows and the full population are
/// chained when computing an instance-specific independence posterior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitOrder {
    /// Rows matching the instance's Z values first; their posterior becomes
    /// the prior for the full population.
    #[default]
    InstanceFirst,
    /// Full population first; its posterior becomes the prior for the
    /// matching rows.
    PopulationFirst,
}

/// Probabilistic independence oracle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Prior probability of independence, in (0, 1).
    pub prior: f64,
    /// Decision cutoff in threshold mode.
    pub cutoff: f64,
    /// Threshold the posterior instead of drawing a Bernoulli decision.
    pub threshold: bool,
    /// Chain instance rows with the population.
    pub instance_specific: bool,
    pub split_order: SplitOrder,
    /// Seed for Bernoulli decisions. None draws from OS entropy.
    pub seed: Option<u64>,
    /// Maximum memoized (x, y, z) entries.
    pub cache_capacity: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            prior: defaults::DEFAULT_ORACLE_PRIOR,
            cutoff: defaults::DEFAULT_ORACLE_CUTOFF,
            threshold: defaults::DEFAULT_ORACLE_THRESHOLD,
            instance_specific: true,
            split_order: SplitOrder::default(),
            seed: None,
            cache_capacity: defaults::DEFAULT_ORACLE_CACHE_CAPACITY,
        }
    }
}

impl OracleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.prior > 0.0 && self.prior < 1.0) {
            return Err(invalid("oracle.prior", "must be in (0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(invalid("oracle.cutoff", "must be in [0, 1]"));
        }
        Ok(())
    }
}
