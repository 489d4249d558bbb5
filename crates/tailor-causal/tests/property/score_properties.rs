//! Property tests for scoring: T1-SCORE-11 through T1-SCORE-15.

use std::sync::Arc;

use proptest::prelude::*;

use tailor_causal::score::{bdeu_row_prior, CountTable, IsScore, LocalScore, PopulationScore, ScoreKind, StructurePrior};
use tailor_core::config::{InstanceStrategy, ScoreConfig};
use tailor_core::data::{Dataset, TestInstance, Variable, MISSING};

const VARS: usize = 4;
const ARITY: usize = 3;

fn build_dataset(rows: &[Vec<i32>]) -> Arc<Dataset> {
    let variables = (0..VARS)
        .map(|i| Variable::with_arity(format!("V{i}"), ARITY).unwrap())
        .collect();
    Arc::new(Dataset::from_rows(variables, rows).unwrap())
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<i32>>> {
    prop::collection::vec(prop::collection::vec(0..ARITY as i32, VARS), 5..60)
}

/// A node, a parent set excluding it, and a further variable outside both.
fn family_strategy() -> impl Strategy<Value = (usize, Vec<usize>, usize)> {
    (0..VARS, prop::collection::vec(any::<bool>(), VARS), 0..VARS).prop_filter_map(
        "x must differ from y and z",
        |(y, mask, x)| {
            let z: Vec<usize> = (0..VARS).filter(|&v| mask[v] && v != y && v != x).collect();
            (x != y).then_some((y, z, x))
        },
    )
}

fn strategy_of(flag: bool) -> InstanceStrategy {
    if flag {
        InstanceStrategy::PosteriorRatio
    } else {
        InstanceStrategy::SplitPopulation
    }
}

// =============================================================================
// T1-SCORE-11: Property test: score differences are consistent
// =============================================================================
proptest! {
    #[test]
    fn t1_score_11_diff_consistency(
        rows in rows_strategy(),
        (y, z, x) in family_strategy(),
        posterior_ratio in any::<bool>(),
        instance_row in 0usize..5,
    ) {
        let data = build_dataset(&rows);
        let population = PopulationScore::new(Arc::clone(&data), ScoreKind::from_config(&ScoreConfig::default())).unwrap();
        let mut with_x = z.clone();
        with_x.push(x);
        let expected = population.local_score(y, &with_x) - population.local_score(y, &z);
        prop_assert!((population.local_score_diff(x, y, &z) - expected).abs() < 1e-9);

        let config = ScoreConfig { strategy: strategy_of(posterior_ratio), ..ScoreConfig::default() };
        let instance = TestInstance::new(&data, data.row(instance_row % data.num_rows())).unwrap();
        let score = IsScore::new(Arc::clone(&data), instance, &config).unwrap();
        let pop_parents = [x];
        let expected = score.local_score(y, &with_x, &pop_parents, &[]) - score.local_score(y, &z, &pop_parents, &[]);
        let diff = score.local_score_diff(x, y, &z, &pop_parents, &[]);
        prop_assert!((diff - expected).abs() < 1e-9, "diff {} expected {}", diff, expected);
    }
}

// =============================================================================
// T1-SCORE-12: Property test: counts partition the rows
// =============================================================================
proptest! {
    #[test]
    fn t1_score_12_counts_partition_rows(
        rows in rows_strategy(),
        (y, z, _x) in family_strategy(),
    ) {
        let data = build_dataset(&rows);
        let table = CountTable::compute(&data, y, &z);
        let total: u64 = (0..table.num_configs()).map(|j| table.n_j(j) as u64).sum();
        prop_assert_eq!(total, rows.len() as u64);
        prop_assert_eq!(table.total(), rows.len() as u64);
        for j in 0..table.num_configs() {
            let row_sum: u32 = (0..table.child_arity()).map(|k| table.n_jk(j, k)).sum();
            prop_assert_eq!(row_sum, table.n_j(j));
        }
    }
}

// =============================================================================
// T1-SCORE-13: Property test: Dirichlet prior mass sums to the ESS
// =============================================================================
proptest! {
    #[test]
    fn t1_score_13_prior_mass_normalized(
        rows in rows_strategy(),
        ess in 0.1f64..50.0,
        is_mask in prop::collection::vec(any::<bool>(), VARS - 1),
        pop_mask in prop::collection::vec(any::<bool>(), VARS - 1),
        q in 1usize..200,
    ) {
        prop_assert!((bdeu_row_prior(ess, q) * q as f64 - ess).abs() < 1e-9 * ess.max(1.0));

        let data = build_dataset(&rows);
        let config = ScoreConfig { sample_prior: ess, ..ScoreConfig::default() };
        let instance = TestInstance::new(&data, data.row(0)).unwrap();
        let score = IsScore::new(Arc::clone(&data), instance, &config).unwrap();
        let parents_is: Vec<usize> = (1..VARS).filter(|&v| is_mask[v - 1]).collect();
        let parents_pop: Vec<usize> = (1..VARS).filter(|&v| pop_mask[v - 1]).collect();
        let (is_mass, pop_masses) = score.split_prior_masses(&parents_is, &parents_pop);
        let total = is_mass + pop_masses.iter().sum::<f64>();
        prop_assert!((total - ess).abs() < 1e-9 * ess.max(1.0), "total {} ess {}", total, ess);
    }
}

// =============================================================================
// T1-SCORE-14: Property test: edit prior cancels with equal weights
// =============================================================================
proptest! {
    #[test]
    fn t1_score_14_edit_prior_symmetry(
        k in 0.01f64..10.0,
        pop_mask in prop::collection::vec(any::<bool>(), 6),
        child_mask in prop::collection::vec(any::<bool>(), 6),
        extra in 0usize..6,
    ) {
        let prior = StructurePrior::new(k, k, 0.5).unwrap();
        let parents_pop: Vec<usize> = (0..6).filter(|&v| pop_mask[v]).collect();
        let children_pop: Vec<usize> = (0..6)
            .filter(|&v| child_mask[v] && !pop_mask[v] && v != extra)
            .collect();

        prop_assert_eq!(prior.log_prior(&parents_pop, &parents_pop, &children_pop), 0.0);

        // Adding a new parent and dropping it again restores the backbone.
        if !parents_pop.contains(&extra) {
            let mut added = parents_pop.clone();
            added.push(extra);
            let add = prior.log_prior(&added, &parents_pop, &children_pop);
            prop_assert!((add - k.ln()).abs() < 1e-12);
            let back: Vec<usize> = added.iter().copied().filter(|&v| v != extra).collect();
            prop_assert_eq!(prior.log_prior(&back, &parents_pop, &children_pop), 0.0);
        }
        // Deleting a POP parent costs the same as adding one.
        if let Some(&dropped) = parents_pop.first() {
            let removed: Vec<usize> = parents_pop[1..].to_vec();
            let del = prior.log_prior(&removed, &parents_pop, &children_pop);
            prop_assert!((del - k.ln()).abs() < 1e-12, "dropping {} gave {}", dropped, del);
        }
    }
}

// =============================================================================
// T1-SCORE-15: Property test: a MISSING IS parent zeroes the instance term
// =============================================================================
proptest! {
    #[test]
    fn t1_score_15_missing_parent_zeroes_instance_term(
        rows in rows_strategy(),
        (y, z, x) in family_strategy(),
        posterior_ratio in any::<bool>(),
    ) {
        let data = build_dataset(&rows);
        let mut values = data.row(0);
        values[x] = MISSING;
        let instance = TestInstance::new(&data, values).unwrap();
        let config = ScoreConfig { strategy: strategy_of(posterior_ratio), ..ScoreConfig::default() };
        let score = IsScore::new(Arc::clone(&data), instance, &config).unwrap();
        let mut parents_is = z.clone();
        parents_is.push(x);
        prop_assert_eq!(score.instance_term(y, &parents_is, &z), 0.0);
    }
}
