//! Error types for the grid core.

use thiserror::Error;

use crate::grid::GridCoord;

/// Result type alias using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;

/// Top-level error type for grid, placement and pathfinding operations.
///
/// Expected outcomes such as "no path" or "cannot build here" are ordinary
/// variants here; nothing in the core panics for them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Coordinate lies outside the grid.
    #[error("Coordinate {0} is outside the grid")]
    OutOfBounds(GridCoord),

    /// Footprint overlaps an occupied or out-of-bounds cell.
    #[error("Cannot build here: footprint anchored at {origin} is blocked")]
    NotBuildable {
        /// Origin cell of the rejected footprint.
        origin: GridCoord,
    },

    /// Search exhausted the open set without reaching the goal.
    #[error("No path from {from} to {to}")]
    NoPathFound {
        /// Start cell of the search.
        from: GridCoord,
        /// Goal cell of the search.
        to: GridCoord,
    },

    /// Footprint template data is malformed.
    #[error("Invalid footprint template '{name}': {reason}")]
    InvalidTemplate {
        /// Template name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No template registered under this name.
    #[error("Unknown footprint template: {0}")]
    UnknownTemplate(String),

    /// No placement with this id.
    #[error("Placement not found: {0}")]
    PlacementNotFound(u64),

    /// Grid configuration is unusable.
    #[error("Invalid grid config: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Snapshot encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Snapshot was written by an incompatible version.
    #[error("Snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build understands.
        expected: u32,
        /// Version found in the data.
        found: u32,
    },
}
