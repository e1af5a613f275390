//! Per-cell occupancy state.
//!
//! A [`Cell`] knows its coordinate, which placement (if any) occupies it,
//! and whether its terrain is passable. A cell is walkable only when both
//! hold: no building and open terrain. Mutations go through
//! [`Grid<Cell>`] so every change reaches the grid's listeners.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridCoord};
use crate::math::{Fixed, Vec3Fixed};
use crate::pathfinding::Walkable;

/// Identifier of a committed placement.
pub type PlacementId = u64;

/// One addressable unit of the building grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Position on the grid, fixed at construction.
    coord: GridCoord,
    /// Placement covering this cell.
    occupant: Option<PlacementId>,
    /// Terrain passability, independent of any building.
    terrain_walkable: bool,
}

impl Cell {
    /// Create an empty, walkable cell.
    #[must_use]
    pub const fn new(coord: GridCoord) -> Self {
        Self {
            coord,
            occupant: None,
            terrain_walkable: true,
        }
    }

    /// Position of this cell on the grid.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Placement covering this cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<PlacementId> {
        self.occupant
    }

    /// True iff no placement covers this cell.
    #[must_use]
    pub const fn can_build(&self) -> bool {
        self.occupant.is_none()
    }

    /// Terrain passability, ignoring any building on the cell.
    #[must_use]
    pub const fn terrain_walkable(&self) -> bool {
        self.terrain_walkable
    }
}

impl Walkable for Cell {
    fn is_walkable(&self) -> bool {
        self.occupant.is_none() && self.terrain_walkable
    }
}

impl Grid<Cell> {
    /// Create a grid of empty, walkable cells.
    ///
    /// # Panics
    ///
    /// Panics on non-positive dimensions or cell size, see [`Grid::new`].
    #[must_use]
    pub fn with_empty_cells(width: u32, height: u32, cell_size: Fixed, origin: Vec3Fixed) -> Self {
        Self::new(width, height, cell_size, origin, Cell::new)
    }

    /// True iff the coordinate is in range and unoccupied.
    #[must_use]
    pub fn can_build(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some_and(Cell::can_build)
    }

    /// True iff the coordinate is in range and walkable.
    #[must_use]
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some_and(Walkable::is_walkable)
    }

    /// Mark a cell as occupied by `placement` and block it for pathfinding.
    ///
    /// Performs no validation; callers check [`Grid::can_build`] first.
    /// Returns `false` if out of bounds.
    pub fn set_occupant(&mut self, coord: GridCoord, placement: PlacementId) -> bool {
        self.update(coord, |cell| cell.occupant = Some(placement))
            .is_some()
    }

    /// Clear a cell's occupant. The cell is walkable again unless its
    /// terrain is blocked. Returns `false` if out of bounds.
    pub fn clear_occupant(&mut self, coord: GridCoord) -> bool {
        self.update(coord, |cell| cell.occupant = None).is_some()
    }

    /// Block or unblock a cell's terrain without touching its occupant.
    ///
    /// A building on the cell keeps blocking it regardless.
    pub fn set_walkable(&mut self, coord: GridCoord, walkable: bool) -> bool {
        self.update(coord, |cell| cell.terrain_walkable = walkable)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn grid(width: u32, height: u32) -> Grid<Cell> {
        Grid::with_empty_cells(width, height, Fixed::from_num(1), Vec3Fixed::ZERO)
    }

    #[test]
    fn test_new_cell_is_empty_and_walkable() {
        let cell = Cell::new(GridCoord::new(2, 3));
        assert_eq!(cell.coord(), GridCoord::new(2, 3));
        assert!(cell.can_build());
        assert!(cell.is_walkable());
        assert_eq!(cell.occupant(), None);
    }

    #[test]
    fn test_set_occupant_blocks_cell() {
        let mut grid = grid(3, 3);
        let c = GridCoord::new(1, 1);

        assert!(grid.set_occupant(c, 7));

        let cell = grid.get(c).unwrap();
        assert_eq!(cell.occupant(), Some(7));
        assert!(!cell.can_build());
        assert!(!cell.is_walkable());
    }

    #[test]
    fn test_clear_occupant_restores_cell() {
        let mut grid = grid(3, 3);
        let c = GridCoord::new(0, 2);

        grid.set_occupant(c, 1);
        assert!(grid.clear_occupant(c));

        assert!(grid.can_build(c));
        assert!(grid.is_walkable(c));
    }

    #[test]
    fn test_out_of_bounds_mutation_is_rejected() {
        let mut grid = grid(2, 2);
        assert!(!grid.set_occupant(GridCoord::new(2, 0), 1));
        assert!(!grid.clear_occupant(GridCoord::new(-1, 0)));
        assert!(!grid.can_build(GridCoord::new(5, 5)));
        assert!(!grid.is_walkable(GridCoord::new(5, 5)));
    }

    #[test]
    fn test_set_walkable_keeps_occupant_untouched() {
        let mut grid = grid(2, 2);
        let c = GridCoord::new(1, 0);

        grid.set_walkable(c, false);
        assert!(!grid.is_walkable(c));
        assert!(grid.can_build(c));
    }

    #[test]
    fn test_blocked_terrain_survives_building_removal() {
        let mut grid = grid(3, 3);
        let c = GridCoord::new(2, 2);

        grid.set_walkable(c, false);
        grid.set_occupant(c, 4);
        assert!(!grid.is_walkable(c));

        grid.clear_occupant(c);
        assert!(grid.can_build(c));
        assert!(!grid.is_walkable(c));
        assert!(!grid.get(c).unwrap().terrain_walkable());
    }

    #[test]
    fn test_unblocking_terrain_does_not_unblock_building() {
        let mut grid = grid(3, 3);
        let c = GridCoord::new(0, 1);

        grid.set_occupant(c, 2);
        grid.set_walkable(c, true);
        assert!(!grid.is_walkable(c));

        grid.clear_occupant(c);
        assert!(grid.is_walkable(c));
    }

    #[test]
    fn test_mutations_notify_listeners() {
        let mut grid = grid(3, 3);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        grid.subscribe(move |c| sink.borrow_mut().push(c));

        grid.set_occupant(GridCoord::new(0, 0), 3);
        grid.clear_occupant(GridCoord::new(0, 0));
        grid.set_walkable(GridCoord::new(2, 1), false);

        assert_eq!(
            *log.borrow(),
            vec![
                GridCoord::new(0, 0),
                GridCoord::new(0, 0),
                GridCoord::new(2, 1)
            ]
        );
    }
}
