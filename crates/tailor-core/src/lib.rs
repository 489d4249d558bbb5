//! # tailor-core
//!
//! Shared foundation for the instance-specific causal discovery engine:
//! error enums, configuration, cancellation, tracing setup, the categorical
//! data model and background knowledge.

pub mod config;
pub mod data;
pub mod errors;
pub mod knowledge;
pub mod tracing;
pub mod traits;

pub use config::TailorConfig;
pub use data::{Dataset, TabularSource, TestInstance, Variable, MISSING};
pub use errors::{TailorError, TailorResult};
pub use knowledge::Knowledge;
pub use traits::{Cancellable, CancellationToken};
