//! TailorErrorCode trait for structured error reporting.

/// Every error enum implements this to provide a stable error code string
/// that drivers can match on without parsing messages.
pub trait TailorErrorCode {
    /// Returns the error code string (e.g., "SCHEMA_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn display_code(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCHEMA_ERROR: &str = "SCHEMA_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SEARCH_ERROR: &str = "SEARCH_ERROR";
pub const CANCELLED: &str = "CANCELLED";
