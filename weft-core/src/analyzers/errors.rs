//! Error types for the analyzer framework.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur during analyzer operations.
///
/// The profiling and discovery passes themselves are total over their
/// inputs; these errors are reserved for invalid configuration handed to a
/// builder and for serialization failures of derived structures.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Data type mismatch or invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic analyzer error with custom message.
    #[error("{0}")]
    Custom(String),
}

impl AnalyzerError {
    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates a custom error with the given message.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Converts serde_json errors to AnalyzerError.
impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
