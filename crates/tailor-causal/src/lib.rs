//! # tailor-causal
//!
//! Instance-specific causal structure learning over categorical data.
//!
//! - **graph**: endpoint-mark graph (DAG, CPDAG and PAG), cycle checks, Meek rules
//! - **score**: count tables, BDeu/BIC population scores, instance-specific scores
//! - **search**: instance-specific FGES over equivalence classes
//! - **orient**: greedy sepsets, FCI rules, instance-specific GFCI
//! - **independence**: probabilistic (Bayesian) and d-separation oracles
//! - **engine**: end-to-end pipeline from data to PAG

pub mod engine;
pub mod graph;
pub mod independence;
pub mod orient;
pub mod score;
pub mod search;

pub use engine::{Pipeline, PipelineReport};
pub use graph::{Edge, Endpoint, EndpointGraph};
pub use independence::{DSeparationTest, IndependenceTest, ProbabilisticTest};
pub use orient::{FciOrient, IsGfci};
pub use score::{IsScore, LocalScore, PopulationScore, ScoreKind};
pub use search::IsFges;
