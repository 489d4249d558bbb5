use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Which marginal-likelihood family the population score uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFamily {
    #[default]
    Bdeu,
    Bic,
}

/// How the test instance enters the local score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStrategy {
    /// Rows matching the instance's IS-parent values form their own Dirichlet
    /// bucket; the rest are scored over the population parents.
    #[default]
    SplitPopulation,
    /// Population score plus a weighted log posterior-predictive ratio at the
    /// instance's own parent configuration.
    PosteriorRatio,
}

/// Score hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub kind: ScoreFamily,
    pub strategy: InstanceStrategy,
    /// Equivalent sample size (ESS).
    pub sample_prior: f64,
    /// Kept for parity with population BDeu; not used by the edit prior.
    pub structure_prior: f64,
    pub k_addition: f64,
    pub k_deletion: f64,
    pub k_reorientation: f64,
    /// BIC penalty multiplier.
    pub penalty_discount: f64,
    /// Weight of the posterior-ratio instance term.
    pub is_alpha: f64,
    /// Capacity of the per-search local score cache.
    pub cache_capacity: u64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            kind: ScoreFamily::default(),
            strategy: InstanceStrategy::default(),
            sample_prior: defaults::DEFAULT_SAMPLE_PRIOR,
            structure_prior: defaults::DEFAULT_STRUCTURE_PRIOR,
            k_addition: defaults::DEFAULT_K_ADDITION,
            k_deletion: defaults::DEFAULT_K_DELETION,
            k_reorientation: defaults::DEFAULT_K_REORIENTATION,
            penalty_discount: defaults::DEFAULT_PENALTY_DISCOUNT,
            is_alpha: defaults::DEFAULT_IS_ALPHA,
            cache_capacity: defaults::DEFAULT_SCORE_CACHE_CAPACITY,
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("score.sample_prior", self.sample_prior)?;
        positive("score.k_addition", self.k_addition)?;
        positive("score.k_deletion", self.k_deletion)?;
        positive("score.k_reorientation", self.k_reorientation)?;
        if !(self.penalty_discount.is_finite() && self.penalty_discount >= 0.0) {
            return Err(invalid("score.penalty_discount", "must be >= 0"));
        }
        if !(self.is_alpha.is_finite() && self.is_alpha >= 0.0) {
            return Err(invalid("score.is_alpha", "must be >= 0"));
        }
        if self.kind == ScoreFamily::Bic && self.strategy == InstanceStrategy::SplitPopulation {
            return Err(invalid(
                "score.strategy",
                "split_population is a Dirichlet construction and requires kind = bdeu",
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be > 0"))
    }
}

pub(crate) fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
