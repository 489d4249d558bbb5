//! Top-level error and the partial-result wrapper for cancellable runs.

use super::error_code::{self, TailorErrorCode};
use super::{ConfigError, SchemaError, SearchError};

/// Errors surfaced by the engine's public entry points.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum TailorError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Run cancelled")]
    Cancelled,
}

impl TailorErrorCode for TailorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Search(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type TailorResult<T> = Result<T, TailorError>;

/// Result of a cancellable run.
/// On cancellation `value` holds the last fully-applied state.
#[derive(Debug, Clone)]
pub struct RunOutcome<T> {
    /// The produced value, complete or partial.
    pub value: T,
    /// True if the run stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl<T> RunOutcome<T> {
    /// A run that finished normally.
    pub fn complete(value: T) -> Self {
        Self {
            value,
            cancelled: false,
        }
    }

    /// A run that stopped at a cancellation checkpoint.
    pub fn partial(value: T) -> Self {
        Self {
            value,
            cancelled: true,
        }
    }

    /// Returns the value, or `TailorError::Cancelled` if the caller needs
    /// strict completion.
    pub fn into_complete(self) -> TailorResult<T> {
        if self.cancelled {
            Err(TailorError::Cancelled)
        } else {
            Ok(self.value)
        }
    }

    /// Map the carried value, keeping the cancellation flag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RunOutcome<U> {
        RunOutcome {
            value: f(self.value),
            cancelled: self.cancelled,
        }
    }
}
