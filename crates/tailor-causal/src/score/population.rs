//! Population BDeu and BIC local scores over categorical data.
//!
//! BDeu: the equivalent sample size is spread uniformly over the `q` parent
//! configurations (`rowPrior = ESS/q`) and then over the `K` child categories
//! (`cellPrior = ESS/(K q)`).
//!
//! BIC: `sum n_jk ln(n_jk / n_j) - 0.5 * penalty * q (K - 1) ln N`.

use std::sync::Arc;

use statrs::function::gamma::ln_gamma;
use tailor_core::config::{ScoreConfig, ScoreFamily};
use tailor_core::data::Dataset;
use tailor_core::errors::ConfigError;

use super::counts::CountTable;

/// A decomposable score over `(node, parents)` pairs.
pub trait LocalScore: Send + Sync {
    /// Score of `node` given a sorted, duplicate-free parent list.
    fn local_score(&self, node: usize, parents: &[usize]) -> f64;

    /// `local_score(y, z + x) - local_score(y, z)`.
    fn local_score_diff(&self, x: usize, y: usize, z: &[usize]) -> f64 {
        let with_x = with_parent(z, x);
        self.local_score(y, &with_x) - self.local_score(y, z)
    }

    fn num_variables(&self) -> usize;

    fn sample_size(&self) -> usize;
}

/// Score family with its hyperparameter, chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreKind {
    Bdeu { sample_prior: f64 },
    Bic { penalty_discount: f64 },
}

impl ScoreKind {
    pub fn from_config(config: &ScoreConfig) -> Self {
        match config.kind {
            ScoreFamily::Bdeu => ScoreKind::Bdeu {
                sample_prior: config.sample_prior,
            },
            ScoreFamily::Bic => ScoreKind::Bic {
                penalty_discount: config.penalty_discount,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ScoreKind::Bdeu { sample_prior } if !(sample_prior.is_finite() && sample_prior > 0.0) => {
                Err(ConfigError::ValidationFailed {
                    field: "score.sample_prior".to_string(),
                    message: "must be > 0".to_string(),
                })
            }
            ScoreKind::Bic { penalty_discount }
                if !(penalty_discount.is_finite() && penalty_discount >= 0.0) =>
            {
                Err(ConfigError::ValidationFailed {
                    field: "score.penalty_discount".to_string(),
                    message: "must be >= 0".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Population score over a shared, read-only dataset.
#[derive(Debug, Clone)]
pub struct PopulationScore {
    data: Arc<Dataset>,
    kind: ScoreKind,
}

impl PopulationScore {
    pub fn new(data: Arc<Dataset>, kind: ScoreKind) -> Result<Self, ConfigError> {
        kind.validate()?;
        Ok(Self { data, kind })
    }

    pub fn from_config(data: Arc<Dataset>, config: &ScoreConfig) -> Result<Self, ConfigError> {
        Self::new(data, ScoreKind::from_config(config))
    }

    pub fn kind(&self) -> ScoreKind {
        self.kind
    }

    pub fn data(&self) -> &Arc<Dataset> {
        &self.data
    }

    /// Score an already computed count table.
    pub fn score_counts(&self, table: &CountTable) -> f64 {
        match self.kind {
            ScoreKind::Bdeu { sample_prior } => bdeu_score(table, sample_prior),
            ScoreKind::Bic { penalty_discount } => {
                bic_score(table, penalty_discount, self.data.num_rows())
            }
        }
    }
}

impl LocalScore for PopulationScore {
    fn local_score(&self, node: usize, parents: &[usize]) -> f64 {
        self.score_counts(&CountTable::compute(&self.data, node, parents))
    }

    fn num_variables(&self) -> usize {
        self.data.num_columns()
    }

    fn sample_size(&self) -> usize {
        self.data.num_rows()
    }
}

/// Pseudo-count mass given to each of `q` parent configurations.
pub fn bdeu_row_prior(sample_prior: f64, q: usize) -> f64 {
    sample_prior / q.max(1) as f64
}

/// BDeu marginal likelihood of a count table.
pub fn bdeu_score(table: &CountTable, sample_prior: f64) -> f64 {
    let k = table.child_arity();
    let row_prior = bdeu_row_prior(sample_prior, table.num_configs());
    let cell_prior = row_prior / k as f64;
    let ln_row = ln_gamma(row_prior);
    let ln_cell = ln_gamma(cell_prior);

    let mut score = 0.0;
    for j in 0..table.num_configs() {
        let n_j = table.n_j(j);
        if n_j == 0 {
            // Empty configurations contribute exactly zero.
            continue;
        }
        score += ln_row - ln_gamma(row_prior + n_j as f64);
        for &n_jk in table.row(j) {
            if n_jk > 0 {
                score += ln_gamma(cell_prior + n_jk as f64) - ln_cell;
            }
        }
    }
    score
}

/// BIC of a count table; zero cells add nothing to the likelihood.
pub fn bic_score(table: &CountTable, penalty_discount: f64, sample_size: usize) -> f64 {
    let k = table.child_arity();
    let q = table.num_configs();
    let mut log_likelihood = 0.0;
    for j in 0..q {
        let n_j = table.n_j(j);
        if n_j == 0 {
            continue;
        }
        for &n_jk in table.row(j) {
            if n_jk > 0 {
                log_likelihood += n_jk as f64 * (n_jk as f64 / n_j as f64).ln();
            }
        }
    }
    let params = (q * (k.saturating_sub(1))) as f64;
    log_likelihood - 0.5 * penalty_discount * params * (sample_size.max(1) as f64).ln()
}

/// Sorted copy of `z` with `x` inserted.
pub(crate) fn with_parent(z: &[usize], x: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(z.len() + 1);
    out.extend_from_slice(z);
    if let Err(pos) = out.binary_search(&x) {
        out.insert(pos, x);
    }
    out
}
