//! Bayesian independence oracle.
//!
//! `P(x _||_ y | z)` compares two BDeu-scored fragments over `{x, y} + z`:
//! the independent fragment `z -> x, z -> y` and the dependent fragment that
//! adds `x -> y`. Evidence is combined with the prior in log space.
//!
//! The instance-specific variant chains two updates: one over the training
//! rows whose `z` values equal the test row's, one over every row, with the
//! first posterior used as the second prior. Either order can be selected.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::trace;

use tailor_core::config::{OracleConfig, SplitOrder};
use tailor_core::data::{Dataset, TestInstance, MISSING};
use tailor_core::errors::ConfigError;

use super::IndependenceTest;
use crate::score::population::with_parent;
use crate::score::{bdeu_score, CountTable};

/// `ln(e^a + e^b)` without overflow.
pub fn log_sum_exp(a: f64, b: f64) -> f64 {
    let hi = a.max(b);
    if hi == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    hi + ((a - hi).exp() + (b - hi).exp()).ln()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    x: usize,
    y: usize,
    z: Vec<usize>,
}

/// Probabilistic independence test over categorical data.
#[derive(Debug)]
pub struct ProbabilisticTest {
    data: Arc<Dataset>,
    names: Vec<String>,
    instance: Option<TestInstance>,
    sample_prior: f64,
    config: OracleConfig,
    memo: DashMap<QueryKey, (f64, bool)>,
    rng: Mutex<ChaCha20Rng>,
}

impl ProbabilisticTest {
    /// Population-only oracle. `sample_prior` is the BDeu equivalent sample
    /// size used for both fragments.
    pub fn new(data: Arc<Dataset>, sample_prior: f64, config: &OracleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(sample_prior.is_finite() && sample_prior > 0.0) {
            return Err(ConfigError::ValidationFailed {
                field: "score.sample_prior".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        Ok(Self {
            names: data.names(),
            data,
            instance: None,
            sample_prior,
            config: config.clone(),
            memo: DashMap::new(),
            rng: Mutex::new(rng),
        })
    }

    /// Chain the test row's matching rows with the population when
    /// `instance_specific` is set in the config.
    pub fn with_instance(mut self, instance: TestInstance) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Posterior probability that `x` and `y` are independent given `z`.
    pub fn probability_independent(&self, x: usize, y: usize, z: &[usize]) -> f64 {
        self.query(x, y, z).0
    }

    /// Number of memoized queries.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    fn query(&self, x: usize, y: usize, z: &[usize]) -> (f64, bool) {
        let mut z_sorted = z.to_vec();
        z_sorted.sort_unstable();
        z_sorted.dedup();
        let key = QueryKey { x, y, z: z_sorted };
        if let Some(hit) = self.memo.get(&key) {
            return *hit;
        }

        let p = self.posterior(x, y, &key.z);
        let independent = if self.config.threshold {
            p >= self.config.cutoff
        } else {
            self.draw(p)
        };
        trace!(x, y, z = ?key.z, p, independent, "independence query");

        if (self.memo.len() as u64) < self.config.cache_capacity {
            self.memo.insert(key, (p, independent));
        }
        (p, independent)
    }

    fn draw(&self, p: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn posterior(&self, x: usize, y: usize, z: &[usize]) -> f64 {
        let complete: Vec<usize> = (0..self.data.num_rows())
            .filter(|&row| {
                self.data.get(row, x) != MISSING
                    && self.data.get(row, y) != MISSING
                    && z.iter().all(|&v| self.data.get(row, v) != MISSING)
            })
            .collect();

        let matching = match (&self.instance, self.config.instance_specific) {
            (Some(instance), true) if !z.is_empty() => instance.values_of(z).map(|values| {
                complete
                    .iter()
                    .copied()
                    .filter(|&row| z.iter().zip(&values).all(|(&v, &t)| self.data.get(row, v) == t))
                    .collect::<Vec<_>>()
            }),
            _ => None,
        };

        let prior = self.config.prior;
        match matching {
            None => self.update(x, y, z, &complete, prior),
            Some(matching) => match self.config.split_order {
                SplitOrder::InstanceFirst => {
                    let first = self.update(x, y, z, &matching, prior);
                    self.update(x, y, z, &complete, first)
                }
                SplitOrder::PopulationFirst => {
                    let first = self.update(x, y, z, &complete, prior);
                    self.update(x, y, z, &matching, first)
                }
            },
        }
    }

    /// One Bayesian update of `P(independent)` over `rows`.
    fn update(&self, x: usize, y: usize, z: &[usize], rows: &[usize], prior: f64) -> f64 {
        let prior = prior.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON);
        let x_given_z = self.fragment(x, z, rows);
        let log_ind = prior.ln() + x_given_z + self.fragment(y, z, rows);
        let log_dep = (1.0 - prior).ln() + x_given_z + self.fragment(y, &with_parent(z, x), rows);
        (log_ind - log_sum_exp(log_ind, log_dep)).exp()
    }

    fn fragment(&self, child: usize, parents: &[usize], rows: &[usize]) -> f64 {
        let table = CountTable::compute_over(&self.data, child, parents, rows.iter().copied());
        bdeu_score(&table, self.sample_prior)
    }
}

impl IndependenceTest for ProbabilisticTest {
    fn is_independent(&self, x: usize, y: usize, z: &[usize]) -> bool {
        self.query(x, y, z).1
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sum_exp_matches_direct_sum() {
        let direct = (2.0f64.exp() + 3.0f64.exp()).ln();
        assert!((log_sum_exp(2.0, 3.0) - direct).abs() < 1e-12);
        assert!((log_sum_exp(-1000.0, -1000.0) - (-1000.0 + 2f64.ln())).abs() < 1e-9);
        assert_eq!(log_sum_exp(f64::NEG_INFINITY, f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert_eq!(log_sum_exp(f64::NEG_INFINITY, 1.5), 1.5);
    }
}
