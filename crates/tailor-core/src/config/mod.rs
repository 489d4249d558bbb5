//! Configuration for scoring, search, orientation and the independence oracle.
//! Every struct is `#[serde(default)]` so partial TOML files are accepted.

pub mod defaults;
pub mod oracle_config;
pub mod orient_config;
pub mod score_config;
pub mod search_config;
pub mod tailor_config;

pub use oracle_config::{OracleConfig, SplitOrder};
pub use orient_config::OrientConfig;
pub use score_config::{InstanceStrategy, ScoreConfig, ScoreFamily};
pub use search_config::{default_degree_cap, SearchConfig};
pub use tailor_config::TailorConfig;
