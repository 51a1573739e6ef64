//! Crate-level error types.
//!
//! Data-shape problems (stale references, empty inputs, degenerate columns)
//! never surface as errors: the engine degrades those to well-defined empty
//! or neutral outputs. Errors exist for configuration mistakes the authoring
//! caller needs to hear about before saving, and for programming-contract
//! violations in builder inputs.

use thiserror::Error;

use crate::analyzers::AnalyzerError;

/// Result type used across weft-core.
pub type Result<T> = std::result::Result<T, WeftError>;

/// Errors reported by the core engine.
#[derive(Error, Debug)]
pub enum WeftError {
    /// A key-combined view saved without a join configuration.
    #[error("view '{view_id}' combines by key but has no join configuration")]
    MissingJoinConfig { view_id: String },

    /// A view references a dataset that is not in the workspace.
    #[error("view '{view_id}' references unknown dataset '{dataset_id}'")]
    UnknownDataset { view_id: String, dataset_id: String },

    /// A view references a column its source dataset does not declare.
    #[error("view '{view_id}' references missing column '{column}' of dataset '{dataset_id}'")]
    UnknownColumn {
        view_id: String,
        dataset_id: String,
        column: String,
    },

    /// Two view columns share an output alias.
    #[error("view '{view_id}' declares alias '{alias}' more than once")]
    DuplicateAlias { view_id: String, alias: String },

    /// A view column names a dataset outside the join's base and targets.
    #[error("view '{view_id}' column '{alias}' references dataset '{dataset_id}' outside the join")]
    ColumnOutsideJoin {
        view_id: String,
        alias: String,
        dataset_id: String,
    },

    /// Invalid analyzer configuration or parameters.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// Serialization of a derived structure failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WeftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
