//! Error handling for Tailor.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod schema_error;
pub mod search_error;
pub mod tailor_error;

pub use config_error::ConfigError;
pub use error_code::TailorErrorCode;
pub use schema_error::SchemaError;
pub use search_error::SearchError;
pub use tailor_error::{RunOutcome, TailorError, TailorResult};
