//! Conditional independence oracles consumed by the orientation phase.

pub mod dsep;
pub mod probabilistic;

pub use dsep::DSeparationTest;
pub use probabilistic::{log_sum_exp, ProbabilisticTest};

/// Decides `x _||_ y | z` over a fixed variable universe.
pub trait IndependenceTest: Send + Sync {
    fn is_independent(&self, x: usize, y: usize, z: &[usize]) -> bool;

    /// Variable names, in index order.
    fn names(&self) -> &[String];

    fn node_index(&self, name: &str) -> Option<usize> {
        self.names().iter().position(|n| n == name)
    }
}
