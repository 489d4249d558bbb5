//! Test fixtures for Tailor: golden JSON files and seeded synthetic
//! categorical data.
//!
//! Golden files live in the workspace-level `test-fixtures/` directory and
//! are found from any crate's `CARGO_MANIFEST_DIR`.

use std::path::PathBuf;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tailor_core::data::{Dataset, TestInstance, Variable};

/// Root directory of the golden fixture files.
fn fixtures_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    // This crate is itself named test-fixtures, so look for the golden subdir.
    while !path.join("test-fixtures").join("golden").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures/golden from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

// ---- dataset fixtures ---------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct VariableFixture {
    pub name: String,
    pub categories: Vec<String>,
}

/// A small categorical dataset plus one test row, both as category indices.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetFixture {
    pub variables: Vec<VariableFixture>,
    pub rows: Vec<Vec<i32>>,
    pub instance: Vec<i32>,
}

impl DatasetFixture {
    pub fn dataset(&self) -> Arc<Dataset> {
        let variables = self
            .variables
            .iter()
            .map(|v| Variable::new(v.name.clone(), v.categories.clone()).expect("fixture variable"))
            .collect();
        Arc::new(Dataset::from_rows(variables, &self.rows).expect("fixture dataset"))
    }

    pub fn test_instance(&self, data: &Dataset) -> TestInstance {
        TestInstance::new(data, self.instance.clone()).expect("fixture instance")
    }
}

// ---- synthetic generators -------------------------------------------------

/// `String` names from string slices.
pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn binary_vars(names: &[&str]) -> Vec<Variable> {
    names
        .iter()
        .map(|n| Variable::with_arity(*n, 2).expect("arity 2"))
        .collect()
}

/// Copy `source` with probability `1 - noise`, otherwise draw uniformly.
fn noisy_copy(rng: &mut ChaCha8Rng, source: i32, arity: i32, noise: f64) -> i32 {
    if rng.gen_bool(noise) {
        rng.gen_range(0..arity)
    } else {
        source
    }
}

/// Binary chain `A -> B -> C`.
pub fn chain(rows: usize, noise: f64, seed: u64) -> Arc<Dataset> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data: Vec<Vec<i32>> = (0..rows)
        .map(|_| {
            let a = rng.gen_range(0..2);
            let b = noisy_copy(&mut rng, a, 2, noise);
            let c = noisy_copy(&mut rng, b, 2, noise);
            vec![a, b, c]
        })
        .collect();
    Arc::new(Dataset::from_rows(binary_vars(&["A", "B", "C"]), &data).expect("chain data"))
}

/// Collider `A -> C <- B` with binary causes and a three-valued sum effect.
pub fn collider(rows: usize, noise: f64, seed: u64) -> Arc<Dataset> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data: Vec<Vec<i32>> = (0..rows)
        .map(|_| {
            let a = rng.gen_range(0..2);
            let b = rng.gen_range(0..2);
            let c = noisy_copy(&mut rng, a + b, 3, noise);
            vec![a, b, c]
        })
        .collect();
    let variables = vec![
        Variable::with_arity("A", 2).expect("arity 2"),
        Variable::with_arity("B", 2).expect("arity 2"),
        Variable::with_arity("C", 3).expect("arity 3"),
    ];
    Arc::new(Dataset::from_rows(variables, &data).expect("collider data"))
}

/// `vars` mutually independent uniform variables named `X0`, `X1`, ...
pub fn independent_uniform(rows: usize, vars: usize, arity: usize, seed: u64) -> Arc<Dataset> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data: Vec<Vec<i32>> = (0..rows)
        .map(|_| (0..vars).map(|_| rng.gen_range(0..arity as i32)).collect())
        .collect();
    let variables = (0..vars)
        .map(|i| Variable::with_arity(format!("X{i}"), arity).expect("arity"))
        .collect();
    Arc::new(Dataset::from_rows(variables, &data).expect("uniform data"))
}

/// `X` cycling through `arity` categories and `Y == X`.
pub fn deterministic_pair(rows: usize, arity: usize) -> Arc<Dataset> {
    let data: Vec<Vec<i32>> = (0..rows)
        .map(|r| {
            let x = (r % arity) as i32;
            vec![x, x]
        })
        .collect();
    let variables = vec![
        Variable::with_arity("X", arity).expect("arity"),
        Variable::with_arity("Y", arity).expect("arity"),
    ];
    Arc::new(Dataset::from_rows(variables, &data).expect("pair data"))
}

/// Row `row` of `data` as a test instance.
pub fn instance_from_row(data: &Dataset, row: usize) -> TestInstance {
    TestInstance::new(data, data.row(row)).expect("row instance")
}
