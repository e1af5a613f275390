//! # Grid Core
//!
//! Deterministic building grid for top-down builders: cell occupancy,
//! multi-cell footprint placement with rotation, and A* pathfinding around
//! whatever has been built.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (snapshots are encoded to strings/bytes; the host stores them)
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`grid`] - Generic XZ grid with world conversion and change listeners
//! - [`cell`] - Per-cell occupancy and walkability
//! - [`pathfinding`] - 8-directional A* over walkable cells
//! - [`footprint`] - Facing directions and rotatable footprint templates
//! - [`placement`] - Placement validation, commitment and removal
//! - [`data`] - RON template definitions and the template registry
//! - [`persistence`] - Grid snapshots
//! - [`building_system`] - The facade a host drives
//! - [`debug_overlay`] - ASCII rendering for debugging
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod building_system;
pub mod cell;
pub mod config;
pub mod data;
pub mod debug_overlay;
pub mod error;
pub mod footprint;
pub mod grid;
pub mod math;
pub mod pathfinding;
pub mod persistence;
pub mod placement;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::building_system::{BuildingSystem, LoadReport, PlacementOutcome};
    pub use crate::cell::{Cell, PlacementId};
    pub use crate::config::GridConfig;
    pub use crate::data::{FootprintData, FootprintSet, TemplateRegistry};
    pub use crate::debug_overlay::{ChangeLog, DebugOverlay};
    pub use crate::error::{GridError, Result};
    pub use crate::footprint::{CellOffset, Direction, FootprintTemplate};
    pub use crate::grid::{Grid, GridCoord};
    pub use crate::math::{Fixed, Vec3Fixed};
    pub use crate::pathfinding::{PathResult, Pathfinder, Walkable};
    pub use crate::persistence::{CellRecord, GridSnapshot};
    pub use crate::placement::{Placement, PlacementEngine, PlacementPreview, PlacementResult};
}
