//! Error types for toolpath tables.

use thiserror::Error;

/// Errors that can occur while building or loading a toolpath.
#[derive(Error, Debug)]
pub enum ToolpathError {
    /// A column does not match the table's row count.
    #[error("column {column:?} has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// Column name.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of the column.
        actual: usize,
    },

    /// Toolpath JSON could not be parsed.
    #[error("invalid toolpath JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for toolpath operations.
pub type Result<T> = std::result::Result<T, ToolpathError>;
