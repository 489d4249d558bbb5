//! Structure-edit prior: penalizes instance-specific parent sets that differ
//! from the population backbone.

use tailor_core::config::ScoreConfig;
use tailor_core::errors::ConfigError;

/// How an instance-specific parent set differs from the population one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCounts {
    /// IS parents that are neither POP parents nor POP children.
    pub added: usize,
    /// POP parents dropped from the IS parent set.
    pub removed: usize,
    /// IS parents that are POP children.
    pub reversed: usize,
}

impl EditCounts {
    pub fn classify(parents_is: &[usize], parents_pop: &[usize], children_pop: &[usize]) -> Self {
        let mut counts = EditCounts::default();
        for p in parents_is {
            if parents_pop.contains(p) {
                continue;
            }
            if children_pop.contains(p) {
                counts.reversed += 1;
            } else {
                counts.added += 1;
            }
        }
        counts.removed = parents_pop
            .iter()
            .filter(|p| !parents_is.contains(p))
            .count();
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.reversed == 0
    }
}

/// `added ln kAddition + removed ln kDeletion + reversed ln kReorientation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructurePrior {
    ln_addition: f64,
    ln_deletion: f64,
    ln_reorientation: f64,
}

impl StructurePrior {
    pub fn new(k_addition: f64, k_deletion: f64, k_reorientation: f64) -> Result<Self, ConfigError> {
        for (field, k) in [
            ("score.k_addition", k_addition),
            ("score.k_deletion", k_deletion),
            ("score.k_reorientation", k_reorientation),
        ] {
            if !(k.is_finite() && k > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be > 0".to_string(),
                });
            }
        }
        Ok(Self {
            ln_addition: k_addition.ln(),
            ln_deletion: k_deletion.ln(),
            ln_reorientation: k_reorientation.ln(),
        })
    }

    pub fn from_config(config: &ScoreConfig) -> Result<Self, ConfigError> {
        Self::new(config.k_addition, config.k_deletion, config.k_reorientation)
    }

    pub fn log_prior_of(&self, edits: &EditCounts) -> f64 {
        edits.added as f64 * self.ln_addition
            + edits.removed as f64 * self.ln_deletion
            + edits.reversed as f64 * self.ln_reorientation
    }

    pub fn log_prior(&self, parents_is: &[usize], parents_pop: &[usize], children_pop: &[usize]) -> f64 {
        self.log_prior_of(&EditCounts::classify(parents_is, parents_pop, children_pop))
    }
}
