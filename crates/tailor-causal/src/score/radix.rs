//! Mixed-radix packing of parent configurations.
//!
//! The first parent is the most significant digit:
//! `index = ((v0 * d1 + v1) * d2 + v2) ...`.

/// Number of configurations for `dims`, clamped to at least 1.
pub fn num_configs(dims: &[usize]) -> usize {
    dims.iter().product::<usize>().max(1)
}

/// Pack `values` (one per dimension) into a configuration index.
pub fn encode(dims: &[usize], values: &[i32]) -> usize {
    debug_assert_eq!(dims.len(), values.len());
    let mut index = 0usize;
    for (&dim, &value) in dims.iter().zip(values) {
        index = index * dim + value as usize;
    }
    index
}

/// Unpack a configuration index into one value per dimension.
pub fn decode(dims: &[usize], mut index: usize) -> Vec<i32> {
    let mut values = vec![0i32; dims.len()];
    for i in (0..dims.len()).rev() {
        values[i] = (index % dims[i]) as i32;
        index /= dims[i];
    }
    values
}
