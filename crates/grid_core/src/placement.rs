//! Building placement validation and commitment.
//!
//! The [`PlacementEngine`] reserves multi-cell footprints on a
//! [`Grid<Cell>`]: it checks every covered cell, writes the occupant (which
//! also blocks the cell for pathfinding), and reverses the reservation on
//! removal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, PlacementId};
use crate::error::{GridError, Result};
use crate::footprint::{Direction, FootprintTemplate};
use crate::grid::{Grid, GridCoord};
use crate::math::{Fixed, Vec3Fixed};

// ============================================================================
// Placement record
// ============================================================================

/// A footprint committed to the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Unique id, also stored in every covered cell.
    pub id: PlacementId,
    /// Name of the template this was built from.
    pub template: String,
    /// Facing direction.
    pub direction: Direction,
    /// Anchor cell.
    pub origin: GridCoord,
    /// Covered cells, in template order.
    pub cells: Vec<GridCoord>,
}

// ============================================================================
// Placement Validation
// ============================================================================

/// Result of placement validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementResult {
    /// Placement is valid.
    Valid,
    /// One or more covered cells are outside the grid.
    OutOfBounds {
        /// Offending coordinates.
        cells: Vec<GridCoord>,
    },
    /// One or more covered cells are occupied.
    Blocked {
        /// Occupied coordinates.
        cells: Vec<GridCoord>,
    },
}

impl PlacementResult {
    /// Check if placement is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PlacementResult::Valid)
    }
}

/// Validate a footprint anchored at `origin` facing `direction`.
///
/// Out-of-bounds cells take precedence over occupied ones in the result.
#[must_use]
pub fn check_placement(
    grid: &Grid<Cell>,
    template: &FootprintTemplate,
    origin: GridCoord,
    direction: Direction,
) -> PlacementResult {
    let mut out_of_bounds = Vec::new();
    let mut blocked = Vec::new();

    for coord in template.cells_at(origin, direction) {
        match grid.get(coord) {
            Some(cell) if cell.can_build() => {}
            Some(_) => blocked.push(coord),
            None => out_of_bounds.push(coord),
        }
    }

    if !out_of_bounds.is_empty() {
        PlacementResult::OutOfBounds {
            cells: out_of_bounds,
        }
    } else if !blocked.is_empty() {
        PlacementResult::Blocked { cells: blocked }
    } else {
        PlacementResult::Valid
    }
}

// ============================================================================
// Placement Engine
// ============================================================================

/// Commits and removes footprints, keeping the record of each placement.
#[derive(Debug, Clone, Default)]
pub struct PlacementEngine {
    /// Live placements by id.
    placements: BTreeMap<PlacementId, Placement>,
    /// Next id to hand out.
    next_id: PlacementId,
}

impl PlacementEngine {
    /// Create an engine with no placements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            placements: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// True iff every covered cell is in bounds and buildable.
    #[must_use]
    pub fn can_place(
        &self,
        grid: &Grid<Cell>,
        template: &FootprintTemplate,
        origin: GridCoord,
        direction: Direction,
    ) -> bool {
        check_placement(grid, template, origin, direction).is_valid()
    }

    /// Validate and commit a footprint.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotBuildable`] if any covered cell is out of
    /// bounds or occupied; the grid is left untouched.
    pub fn place(
        &mut self,
        grid: &mut Grid<Cell>,
        template: &FootprintTemplate,
        origin: GridCoord,
        direction: Direction,
    ) -> Result<PlacementId> {
        let result = check_placement(grid, template, origin, direction);
        if !result.is_valid() {
            tracing::debug!(
                template = template.name(),
                %origin,
                ?direction,
                ?result,
                "Cannot build here"
            );
            return Err(GridError::NotBuildable { origin });
        }

        let id = self.allocate_id();
        let cells = template.cells_at(origin, direction);
        for &coord in &cells {
            grid.set_occupant(coord, id);
        }

        tracing::debug!(
            id,
            template = template.name(),
            %origin,
            ?direction,
            cells = cells.len(),
            "Placed footprint"
        );

        self.placements.insert(
            id,
            Placement {
                id,
                template: template.name().to_owned(),
                direction,
                origin,
                cells,
            },
        );
        Ok(id)
    }

    /// Remove a placement, freeing and unblocking every cell it covered.
    ///
    /// Returns the discarded record, or `None` for an unknown id.
    pub fn remove(&mut self, grid: &mut Grid<Cell>, id: PlacementId) -> Option<Placement> {
        let placement = self.placements.remove(&id)?;
        for &coord in &placement.cells {
            grid.clear_occupant(coord);
        }
        tracing::debug!(id, origin = %placement.origin, "Removed placement");
        Some(placement)
    }

    /// Remove every placement.
    pub fn clear(&mut self, grid: &mut Grid<Cell>) {
        let ids: Vec<PlacementId> = self.placements.keys().copied().collect();
        for id in ids {
            self.remove(grid, id);
        }
    }

    /// Placement covering a cell.
    #[must_use]
    pub fn placement_at(&self, grid: &Grid<Cell>, coord: GridCoord) -> Option<&Placement> {
        grid.get(coord)
            .and_then(Cell::occupant)
            .and_then(|id| self.placements.get(&id))
    }

    /// Look up a placement by id.
    #[must_use]
    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    /// All placements in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.values()
    }

    /// Number of live placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// True if nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    fn allocate_id(&mut self) -> PlacementId {
        // Default-constructed engines start at 0; ids are never 0.
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ============================================================================
// Placement Preview (Ghost Building)
// ============================================================================

/// Data for rendering a building placement preview.
///
/// Used by the host to draw where a building would go and whether it fits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Snapped world position of the building's pivot.
    pub position: Vec3Fixed,
    /// Anchor cell under the cursor.
    pub origin: GridCoord,
    /// Facing direction.
    pub direction: Direction,
    /// Yaw in degrees.
    pub rotation_angle: u32,
    /// Cells the building would cover.
    pub cells: Vec<GridCoord>,
    /// Whether the placement would succeed.
    pub is_valid: bool,
    /// Cells that are occupied or out of bounds.
    pub blocked_cells: Vec<GridCoord>,
}

impl PlacementPreview {
    /// Build a preview for `template` anchored at `origin`.
    #[must_use]
    pub fn new(
        grid: &Grid<Cell>,
        template: &FootprintTemplate,
        origin: GridCoord,
        direction: Direction,
    ) -> Self {
        let (is_valid, blocked_cells) = match check_placement(grid, template, origin, direction) {
            PlacementResult::Valid => (true, Vec::new()),
            PlacementResult::Blocked { cells } | PlacementResult::OutOfBounds { cells } => {
                (false, cells)
            }
        };

        Self {
            position: snapped_position(grid, template, origin, direction),
            origin,
            direction,
            rotation_angle: direction.rotation_angle(),
            cells: template.cells_at(origin, direction),
            is_valid,
            blocked_cells,
        }
    }
}

/// World position of a rotated building's pivot anchored at `origin`.
#[must_use]
pub fn snapped_position(
    grid: &Grid<Cell>,
    template: &FootprintTemplate,
    origin: GridCoord,
    direction: Direction,
) -> Vec3Fixed {
    let (dx, dz) = template.rotation_offset(direction);
    let shift = Vec3Fixed::new(Fixed::from_num(dx), Fixed::ZERO, Fixed::from_num(dz));
    grid.cell_to_world(origin) + shift.scale(grid.cell_size())
}

// ============================================================================
// Tests
// ============================================================================
