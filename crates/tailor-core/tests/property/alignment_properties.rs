//! Property tests for test-instance alignment: T0-DATA-09 and T0-DATA-10.

use proptest::prelude::*;

use tailor_core::data::{Dataset, TestInstance, Variable, MISSING};

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|k| format!("c{k}")).collect()
}

/// Permute `0..n` using a vector of random keys.
fn permutation(keys: &[u32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..keys.len()).collect();
    idx.sort_by_key(|&i| (keys[i], i));
    idx
}

// =============================================================================
// T0-DATA-09: Permuting labels and remapping recovers the training indices
// =============================================================================
proptest! {
    #[test]
    fn t0_data_09_remap_round_trip(
        arity in 2usize..6,
        keys in prop::collection::vec(any::<u32>(), 6),
        value_seed in 0usize..100,
        missing in any::<bool>(),
    ) {
        let train_labels = labels(arity);
        let train = Dataset::from_rows(
            vec![Variable::new("X", train_labels.clone()).unwrap()],
            &[vec![0]],
        ).unwrap();

        let perm = permutation(&keys[..arity]);
        let inst_labels: Vec<String> = perm.iter().map(|&i| train_labels[i].clone()).collect();
        let true_value = (value_seed % arity) as i32;
        let inst_value = if missing {
            MISSING
        } else {
            inst_labels.iter().position(|l| *l == train_labels[true_value as usize]).unwrap() as i32
        };
        let instance = Dataset::from_rows(
            vec![Variable::new("X", inst_labels).unwrap()],
            &[vec![inst_value]],
        ).unwrap();

        let aligned = TestInstance::from_single_row(&train, &instance).unwrap();
        let expected = if missing { MISSING } else { true_value };
        prop_assert_eq!(aligned.value(0), expected);
    }
}

// =============================================================================
// T0-DATA-10: Column order in the instance never matters
// =============================================================================
proptest! {
    #[test]
    fn t0_data_10_column_order_irrelevant(
        values in prop::collection::vec(0i32..3, 4),
        keys in prop::collection::vec(any::<u32>(), 4),
    ) {
        let names = ["A", "B", "C", "D"];
        let vars: Vec<Variable> = names.iter().map(|n| Variable::with_arity(*n, 3).unwrap()).collect();
        let train = Dataset::from_rows(vars.clone(), &[values.clone()]).unwrap();

        let perm = permutation(&keys);
        let shuffled_vars: Vec<Variable> = perm.iter().map(|&i| vars[i].clone()).collect();
        let shuffled_row: Vec<i32> = perm.iter().map(|&i| values[i]).collect();
        let instance = Dataset::from_rows(shuffled_vars, &[shuffled_row]).unwrap();

        let aligned = TestInstance::from_single_row(&train, &instance).unwrap();
        prop_assert_eq!(aligned.values(), values.as_slice());
    }
}
