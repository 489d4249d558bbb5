//! Instance-specific local scores.
//!
//! Two strategies are available and kept separate:
//!
//! - **Split population**: training rows whose IS-parent values equal the
//!   test row's form an IS bucket scored as a single Dirichlet cell; all other
//!   rows are scored as an ordinary BDeu table over the POP parents. Both terms
//!   draw prior mass from one uniform prior over the union of POP and IS
//!   parents, with the IS bucket's share taken first.
//! - **Posterior ratio**: the population score of the IS parent set plus
//!   `alpha ln((N_ijk + ESS/(r q)) / (N_ij + ESS/q))` at the test row's own
//!   parent configuration `j` and child value `k`.
//!
//! Both add the structure-edit prior from [`StructurePrior`].

use std::sync::Arc;

use statrs::function::gamma::ln_gamma;
use tailor_core::config::{default_degree_cap, InstanceStrategy, ScoreConfig};
use tailor_core::data::{Dataset, TestInstance, MISSING};
use tailor_core::errors::{SchemaError, SearchError, TailorResult};

use super::cache::{LocalScoreCache, ScoreKey};
use super::counts::CountTable;
use super::population::{with_parent, PopulationScore};
use super::radix;
use super::structure_prior::StructurePrior;
use crate::graph::EndpointGraph;

/// Instance-specific score for one test row against a training dataset.
#[derive(Debug)]
pub struct IsScore {
    population: PopulationScore,
    data: Arc<Dataset>,
    instance: TestInstance,
    strategy: InstanceStrategy,
    sample_prior: f64,
    is_alpha: f64,
    structure_prior: StructurePrior,
    cache: LocalScoreCache,
}

impl IsScore {
    pub fn new(data: Arc<Dataset>, instance: TestInstance, config: &ScoreConfig) -> TailorResult<Self> {
        config.validate()?;
        if instance.values().len() != data.num_columns() {
            return Err(SchemaError::ColumnCountMismatch {
                expected: data.num_columns(),
                found: instance.values().len(),
            }
            .into());
        }
        Ok(Self {
            population: PopulationScore::from_config(Arc::clone(&data), config)?,
            structure_prior: StructurePrior::from_config(config)?,
            strategy: config.strategy,
            sample_prior: config.sample_prior,
            is_alpha: config.is_alpha,
            cache: LocalScoreCache::new(config.cache_capacity),
            data,
            instance,
        })
    }

    pub fn population(&self) -> &PopulationScore {
        &self.population
    }

    pub fn data(&self) -> &Arc<Dataset> {
        &self.data
    }

    pub fn instance(&self) -> &TestInstance {
        &self.instance
    }

    pub fn strategy(&self) -> InstanceStrategy {
        self.strategy
    }

    pub fn num_variables(&self) -> usize {
        self.data.num_columns()
    }

    pub fn sample_size(&self) -> usize {
        self.data.num_rows()
    }

    pub fn names(&self) -> Vec<String> {
        self.data.names()
    }

    /// Default degree cap for the search: `ceil(ln(max(2, N)))`.
    pub fn max_degree(&self) -> usize {
        default_degree_cap(self.sample_size())
    }

    /// Full local score, structure-edit prior included.
    pub fn local_score(
        &self,
        node: usize,
        parents_is: &[usize],
        parents_pop: &[usize],
        children_pop: &[usize],
    ) -> f64 {
        self.local_score_without_structure_prior(node, parents_is, parents_pop, children_pop)
            + self.structure_prior(parents_is, parents_pop, children_pop)
    }

    /// Local score minus the structure-edit prior. Cached.
    pub fn local_score_without_structure_prior(
        &self,
        node: usize,
        parents_is: &[usize],
        parents_pop: &[usize],
        _children_pop: &[usize],
    ) -> f64 {
        let key = ScoreKey::new(node, parents_is, parents_pop);
        self.cache.get_or_compute(key, || match self.strategy {
            InstanceStrategy::SplitPopulation => {
                let (pop, is) = self.split_population_terms(node, parents_is, parents_pop);
                pop + is
            }
            InstanceStrategy::PosteriorRatio => {
                let table = CountTable::compute(&self.data, node, parents_is);
                self.population.score_counts(&table) + self.posterior_ratio_term(node, parents_is, &table)
            }
        })
    }

    /// `local_score(y, z + x) - local_score(y, z)` in the same POP context.
    pub fn local_score_diff(&self, x: usize, y: usize, z: &[usize], z_pop: &[usize], children_pop: &[usize]) -> f64 {
        let with_x = with_parent(z, x);
        self.local_score(y, &with_x, z_pop, children_pop) - self.local_score(y, z, z_pop, children_pop)
    }

    pub fn structure_prior(&self, parents_is: &[usize], parents_pop: &[usize], children_pop: &[usize]) -> f64 {
        self.structure_prior.log_prior(parents_is, parents_pop, children_pop)
    }

    /// The instance-specific part of the score for `node` given `parents_is`.
    ///
    /// Posterior ratio: zero when the test row is MISSING at the node or any
    /// IS parent. Split population: the IS bucket term, zero when the test row
    /// is MISSING at any IS parent or there are no IS parents.
    pub fn instance_term(&self, node: usize, parents_is: &[usize], parents_pop: &[usize]) -> f64 {
        match self.strategy {
            InstanceStrategy::SplitPopulation => self.split_population_terms(node, parents_is, parents_pop).1,
            InstanceStrategy::PosteriorRatio => {
                let table = CountTable::compute(&self.data, node, parents_is);
                self.posterior_ratio_term(node, parents_is, &table)
            }
        }
    }

    /// Sum of local scores without the structure-edit prior over a DAG, with
    /// POP context from `population`.
    pub fn score_dag(&self, dag: &EndpointGraph, population: &EndpointGraph) -> Result<f64, SearchError> {
        self.check_graph(dag)?;
        self.check_graph(population)?;
        Ok(dag
            .nodes()
            .map(|y| {
                self.local_score_without_structure_prior(
                    y,
                    &dag.parents(y),
                    &population.parents(y),
                    &population.children(y),
                )
            })
            .sum())
    }

    /// A graph must be over the score's variables, in column order.
    pub fn check_graph(&self, graph: &EndpointGraph) -> Result<(), SearchError> {
        let names = self.data.names();
        if graph.names() != names.as_slice() {
            return Err(SearchError::VariableMismatch {
                details: format!("graph nodes {:?} vs data columns {:?}", graph.names(), names),
            });
        }
        Ok(())
    }

    /// Prior mass of the IS bucket and of each POP configuration, scaled by
    /// the sample prior. The masses sum to the sample prior.
    pub fn split_prior_masses(&self, parents_is: &[usize], parents_pop: &[usize]) -> (f64, Vec<f64>) {
        let test_is = self.active_is_values(parents_is);
        let dims_p: Vec<usize> = parents_pop.iter().map(|&p| self.data.arity(p)).collect();
        let r_p = radix::num_configs(&dims_p);
        let is_mass = match &test_is {
            Some(_) => {
                let dims_is: Vec<usize> = parents_is.iter().map(|&p| self.data.arity(p)).collect();
                1.0 / radix::num_configs(&dims_is) as f64
            }
            None => 0.0,
        };
        // Share of a consistent POP configuration's union cells taken by the IS bucket.
        let is_only: usize = parents_is
            .iter()
            .filter(|p| !parents_pop.contains(p))
            .map(|&p| self.data.arity(p))
            .product();
        let consumed = 1.0 / is_only.max(1) as f64;
        let overlap: Vec<(usize, usize)> = parents_pop
            .iter()
            .enumerate()
            .filter_map(|(i, p)| parents_is.iter().position(|q| q == p).map(|j| (i, j)))
            .collect();

        let pop_masses = (0..r_p)
            .map(|j| {
                let base = 1.0 / r_p as f64;
                let mass = match &test_is {
                    Some(test) => {
                        let vals = radix::decode(&dims_p, j);
                        if overlap.iter().all(|&(i, k)| vals[i] == test[k]) {
                            if is_only == 1 {
                                0.0
                            } else {
                                base * (1.0 - consumed)
                            }
                        } else {
                            base
                        }
                    }
                    None => base,
                };
                self.sample_prior * mass
            })
            .collect();
        (self.sample_prior * is_mass, pop_masses)
    }

    /// Test-row values of the IS parents, if there are any and none is MISSING.
    fn active_is_values(&self, parents_is: &[usize]) -> Option<Vec<i32>> {
        if parents_is.is_empty() {
            return None;
        }
        self.instance.values_of(parents_is)
    }

    /// `(pop term, IS term)` for the split-population strategy.
    fn split_population_terms(&self, node: usize, parents_is: &[usize], parents_pop: &[usize]) -> (f64, f64) {
        let k = self.data.arity(node);
        let dims_p: Vec<usize> = parents_pop.iter().map(|&p| self.data.arity(p)).collect();
        let r_p = radix::num_configs(&dims_p);
        let test_is = self.active_is_values(parents_is);

        let mut np_jk = vec![0u32; r_p * k];
        let mut np_j = vec![0u32; r_p];
        let mut ni_jk = vec![0u32; k];
        let mut ni_j = 0u32;

        let child = self.data.column(node);
        let is_cols: Vec<&[i32]> = parents_is.iter().map(|&p| self.data.column(p)).collect();
        let pop_cols: Vec<&[i32]> = parents_pop.iter().map(|&p| self.data.column(p)).collect();

        'rows: for row in 0..self.data.num_rows() {
            if is_cols.iter().any(|c| c[row] == MISSING) {
                continue;
            }
            let y = child[row];
            if y == MISSING {
                continue;
            }
            if let Some(test) = &test_is {
                if is_cols.iter().zip(test).all(|(c, &t)| c[row] == t) {
                    ni_jk[y as usize] += 1;
                    ni_j += 1;
                    continue;
                }
            }
            let mut j = 0usize;
            for (c, &dim) in pop_cols.iter().zip(&dims_p) {
                let v = c[row];
                if v == MISSING {
                    continue 'rows;
                }
                j = j * dim + v as usize;
            }
            np_jk[j * k + y as usize] += 1;
            np_j[j] += 1;
        }

        let (is_mass, pop_masses) = self.split_prior_masses(parents_is, parents_pop);

        let mut score_is = 0.0;
        if test_is.is_some() {
            score_is = dirichlet_cell(is_mass, &ni_jk, ni_j);
        }

        let mut score_pop = 0.0;
        for (j, &row_prior) in pop_masses.iter().enumerate() {
            if row_prior > 0.0 {
                score_pop += dirichlet_cell(row_prior, &np_jk[j * k..(j + 1) * k], np_j[j]);
            }
        }
        (score_pop, score_is)
    }

    fn posterior_ratio_term(&self, node: usize, parents_is: &[usize], table: &CountTable) -> f64 {
        if self.is_alpha == 0.0 || self.instance.is_missing(node) {
            return 0.0;
        }
        let Some(values) = self.instance.values_of(parents_is) else {
            return 0.0;
        };
        let j = radix::encode(table.parent_dims(), &values);
        let k = self.instance.value(node) as usize;
        let q = table.num_configs() as f64;
        let r = table.child_arity() as f64;
        let numerator = table.n_jk(j, k) as f64 + self.sample_prior / (r * q);
        let denominator = table.n_j(j) as f64 + self.sample_prior / q;
        self.is_alpha * (numerator / denominator).ln()
    }
}

/// `sum_k [lnG(a/K + n_k) - lnG(a/K)] - lnG(a + n) + lnG(a)` for row prior `a`.
fn dirichlet_cell(row_prior: f64, counts: &[u32], total: u32) -> f64 {
    let cell_prior = row_prior / counts.len() as f64;
    let ln_cell = ln_gamma(cell_prior);
    let mut score = ln_gamma(row_prior) - ln_gamma(row_prior + total as f64);
    for &n in counts {
        score += ln_gamma(cell_prior + n as f64) - ln_cell;
    }
    score
}
