//! d-separation oracle over a known DAG.

use tailor_core::errors::SearchError;

use super::IndependenceTest;
use crate::graph::dag_enforcement::is_acyclic;
use crate::graph::paths::is_d_separated;
use crate::graph::EndpointGraph;

/// Answers independence queries by d-separation in a true DAG.
#[derive(Debug, Clone)]
pub struct DSeparationTest {
    dag: EndpointGraph,
}

impl DSeparationTest {
    /// `dag` must be fully directed and acyclic.
    pub fn new(dag: EndpointGraph) -> Result<Self, SearchError> {
        if !dag.is_fully_directed() || !is_acyclic(&dag) {
            return Err(SearchError::InvalidArgument {
                reason: "d-separation requires a directed acyclic graph".to_string(),
            });
        }
        Ok(Self { dag })
    }

    pub fn dag(&self) -> &EndpointGraph {
        &self.dag
    }
}

impl IndependenceTest for DSeparationTest {
    fn is_independent(&self, x: usize, y: usize, z: &[usize]) -> bool {
        is_d_separated(&self.dag, x, y, z)
    }

    fn names(&self) -> &[String] {
        self.dag.names()
    }
}
