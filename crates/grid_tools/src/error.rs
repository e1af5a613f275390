//! Error type for tool operations.

use grid_core::error::GridError;
use thiserror::Error;

/// Error type for tool operations.
#[derive(Error, Debug)]
pub enum ToolError {
    /// File or directory not found.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Failed to read a file.
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse a scenario.
    #[error("Failed to parse scenario '{path}': {message}")]
    ParseError {
        /// Scenario file path.
        path: String,
        /// Parser message.
        message: String,
    },
    /// Grid operation failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Failed to encode JSON output.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;
