//! Error types for the Tabscope library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tabscope operations.
///
/// Only dataset-level failures surface here. Column and table level problems
/// are recorded inline in the report instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The dataset contains no tables at all.
    #[error("Dataset '{0}' contains no tables")]
    EmptyDataset(String),

    /// Two tables share a name, so the report cannot key them.
    #[error("Duplicate table name: {0}")]
    DuplicateTable(String),

    /// The dataset is too large for in-memory analysis.
    #[error("Dataset has {cells} cells, exceeding the limit of {limit}")]
    ResourceExhausted { cells: usize, limit: usize },

    /// The caller raised the abort signal.
    #[error("Analysis aborted during {stage}")]
    Aborted { stage: &'static str },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Source format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Source had no usable rows or columns.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Tabscope operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
