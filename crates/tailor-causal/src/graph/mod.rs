pub mod dag_enforcement;
pub mod endpoint;
pub mod endpoint_graph;
pub mod meek;
pub mod paths;
pub mod transforms;

pub use endpoint::{Edge, Endpoint};
pub use endpoint_graph::{EndpointGraph, GraphSnapshot};
pub use meek::MeekRules;
pub use transforms::{dag_from_cpdag, dag_from_cpdag_guided, violates_knowledge};
