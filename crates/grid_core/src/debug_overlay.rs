//! Text rendering of a building grid for terminals and test failures.
//!
//! One row per `z`, highest row first so the output reads like a top-down
//! map with +Z pointing up.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::cell::Cell;
use crate::grid::{Grid, GridCoord};
use crate::pathfinding::Walkable;

/// Characters used by [`DebugOverlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Empty, walkable cell.
    pub free: char,
    /// Cell covered by a building.
    pub occupied: char,
    /// Empty cell blocked for pathfinding.
    pub blocked: char,
    /// Cell on the highlighted path.
    pub path: char,
    /// Print x and z axis labels around the map.
    pub show_axes: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            free: '.',
            occupied: '#',
            blocked: 'x',
            path: '*',
            show_axes: false,
        }
    }
}

/// ASCII renderer for a [`Grid<Cell>`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugOverlay {
    style: OverlayStyle,
}

impl DebugOverlay {
    /// Renderer with the default characters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer with custom characters.
    #[must_use]
    pub const fn with_style(style: OverlayStyle) -> Self {
        Self { style }
    }

    /// Render with the default style.
    #[must_use]
    pub fn render(grid: &Grid<Cell>, path: Option<&[GridCoord]>) -> String {
        Self::new().render_styled(grid, path)
    }

    /// Render with this overlay's style. Path cells win over cell state.
    #[must_use]
    pub fn render_styled(&self, grid: &Grid<Cell>, path: Option<&[GridCoord]>) -> String {
        let on_path: BTreeSet<GridCoord> = path.unwrap_or_default().iter().copied().collect();
        let width = grid.width() as i32;
        let height = grid.height() as i32;
        let mut out =
            String::with_capacity((grid.width() as usize + 8) * (grid.height() as usize + 1));

        for z in (0..height).rev() {
            if self.style.show_axes {
                let _ = write!(out, "{z:>3} ");
            }
            for x in 0..width {
                let coord = GridCoord::new(x, z);
                out.push(self.glyph(grid, coord, on_path.contains(&coord)));
            }
            out.push('\n');
        }

        if self.style.show_axes {
            out.push_str("    ");
            for x in 0..width {
                let _ = write!(out, "{}", x % 10);
            }
            out.push('\n');
        }
        out
    }

    fn glyph(&self, grid: &Grid<Cell>, coord: GridCoord, on_path: bool) -> char {
        if on_path {
            return self.style.path;
        }
        match grid.get(coord) {
            Some(cell) if !cell.can_build() => self.style.occupied,
            Some(cell) if !cell.is_walkable() => self.style.blocked,
            _ => self.style.free,
        }
    }
}

/// Shared recorder of cell change notifications.
///
/// Clone it, hand [`ChangeLog::listener`] to the grid, and read the
/// recorded coordinates back through the original.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Rc<RefCell<Vec<GridCoord>>>,
}

impl ChangeLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A grid listener appending to this log.
    #[must_use]
    pub fn listener(&self) -> impl FnMut(GridCoord) + 'static {
        let changes = Rc::clone(&self.changes);
        move |coord| changes.borrow_mut().push(coord)
    }

    /// Drain recorded changes, oldest first.
    #[must_use]
    pub fn take(&self) -> Vec<GridCoord> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }

    /// Number of recorded changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    /// True if nothing was recorded since the last [`ChangeLog::take`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Fixed, Vec3Fixed};

    fn grid(width: u32, height: u32) -> Grid<Cell> {
        Grid::with_empty_cells(width, height, Fixed::from_num(1), Vec3Fixed::ZERO)
    }

    #[test]
    fn test_render_marks_cells() {
        let mut grid = grid(4, 3);
        grid.set_occupant(GridCoord::new(1, 2), 1);
        grid.set_walkable(GridCoord::new(3, 0), false);

        let path = [GridCoord::new(0, 0), GridCoord::new(1, 1)];
        let text = DebugOverlay::render(&grid, Some(&path));

        assert_eq!(text, ".#..\n.*..\n*..x\n");
    }

    #[test]
    fn test_render_without_path() {
        let grid = grid(2, 2);
        assert_eq!(DebugOverlay::render(&grid, None), "..\n..\n");
    }

    #[test]
    fn test_custom_style_with_axes() {
        let mut grid = grid(3, 2);
        grid.set_occupant(GridCoord::new(0, 0), 7);
        let overlay = DebugOverlay::with_style(OverlayStyle {
            occupied: 'B',
            show_axes: true,
            ..OverlayStyle::default()
        });

        let text = overlay.render_styled(&grid, None);
        assert_eq!(text, "  1 ...\n  0 B..\n    012\n");
    }

    #[test]
    fn test_change_log_records_in_order() {
        let mut grid = grid(3, 3);
        let log = ChangeLog::new();
        grid.subscribe(log.listener());

        grid.set_occupant(GridCoord::new(2, 1), 1);
        grid.set_walkable(GridCoord::new(0, 0), false);
        grid.set_occupant(GridCoord::new(9, 9), 1);

        assert_eq!(log.len(), 2);
        assert_eq!(log.take(), vec![GridCoord::new(2, 1), GridCoord::new(0, 0)]);
        assert!(log.is_empty());
    }
}
