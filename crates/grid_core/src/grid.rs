//! Fixed-size XZ grid with per-cell payload and change notification.
//!
//! The grid owns a dense `width × height` array of cells, converts between
//! world positions and cell coordinates, and tells registered listeners
//! about every cell mutation, synchronously and in registration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec3Fixed};

/// Cell coordinate on the grid.
///
/// Signed so that conversions from world space can report positions left
/// of or below the origin; such coordinates are simply out of range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub z: i32,
}

impl GridCoord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Coordinate shifted by `(dx, dz)`, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// Coordinate shifted by `(dx, dz)`, or `None` if either axis overflows.
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dz: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.z.checked_add(dz)) {
            (Some(x), Some(z)) => Some(Self { x, z }),
            _ => None,
        }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

impl From<(i32, i32)> for GridCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

/// Callback invoked with the coordinate of every changed cell.
pub type CellListener = Box<dyn FnMut(GridCoord)>;

/// Dense 2D grid of cells laid out on the world XZ plane.
pub struct Grid<T> {
    /// Grid width in cells (X axis).
    width: u32,
    /// Grid height in cells (Z axis).
    height: u32,
    /// Size of each cell in world units.
    cell_size: Fixed,
    /// World position of cell (0, 0)'s corner.
    origin: Vec3Fixed,
    /// Cell data stored in x-major order.
    cells: Vec<T>,
    /// Change listeners, append-only.
    listeners: Vec<CellListener>,
}

impl<T> Grid<T> {
    /// Create a grid, building every cell with `factory`.
    ///
    /// The factory is called in x-major order: for each column `x`, every
    /// row `z` from 0 upwards.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero or exceeds `i32::MAX`, or if
    /// `cell_size` is not positive.
    pub fn new<F>(width: u32, height: u32, cell_size: Fixed, origin: Vec3Fixed, mut factory: F) -> Self
    where
        F: FnMut(GridCoord) -> T,
    {
        assert!(width > 0, "Grid width must be positive");
        assert!(height > 0, "Grid height must be positive");
        assert!(
            i32::try_from(width).is_ok() && i32::try_from(height).is_ok(),
            "Grid dimensions must fit in i32"
        );
        assert!(cell_size > Fixed::ZERO, "Grid cell_size must be positive");

        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for x in 0..width as i32 {
            for z in 0..height as i32 {
                cells.push(factory(GridCoord::new(x, z)));
            }
        }

        Self {
            width,
            height,
            cell_size,
            origin,
            cells,
            listeners: Vec::new(),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    /// World position of the grid origin.
    #[must_use]
    pub const fn origin(&self) -> Vec3Fixed {
        self.origin
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid has at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if a coordinate lies within the grid.
    #[must_use]
    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.width
            && (coord.z as u32) < self.height
    }

    /// Array index of a coordinate, or `None` when out of range.
    #[must_use]
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some((coord.x as usize) * (self.height as usize) + (coord.z as usize))
        } else {
            None
        }
    }

    /// Coordinate of an array index.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> GridCoord {
        let height = self.height as usize;
        GridCoord::new((index / height) as i32, (index % height) as i32)
    }

    /// Get the cell at a coordinate; `None` when out of range.
    #[must_use]
    pub fn get(&self, coord: GridCoord) -> Option<&T> {
        self.index_of(coord).map(|index| &self.cells[index])
    }

    /// Get the cell at an array index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.cells.get(index)
    }

    /// Get the cell containing a world position.
    #[must_use]
    pub fn get_at_world(&self, world: Vec3Fixed) -> Option<&T> {
        self.get(self.world_to_cell(world))
    }

    /// Iterate all cells with their coordinates in x-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (self.coord_of(index), cell))
    }

    /// Mutate one cell and notify listeners.
    ///
    /// Returns `None` without calling `f` when the coordinate is out of range.
    pub fn update<R>(&mut self, coord: GridCoord, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let index = self.index_of(coord)?;
        let result = f(&mut self.cells[index]);
        self.notify_cell_changed(coord);
        Some(result)
    }

    /// Register a change listener. Listeners live as long as the grid.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(GridCoord) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Register an already boxed listener.
    pub fn subscribe_boxed(&mut self, listener: CellListener) {
        self.listeners.push(listener);
    }

    /// Detach every listener, e.g. to move them onto a rebuilt grid.
    pub fn take_listeners(&mut self) -> Vec<CellListener> {
        std::mem::take(&mut self.listeners)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Invoke every listener with `coord`, in registration order.
    pub fn notify_cell_changed(&mut self, coord: GridCoord) {
        for listener in &mut self.listeners {
            listener(coord);
        }
    }

    /// Convert a world position to the cell containing it.
    ///
    /// The result may be out of range; callers bounds-check via [`Grid::get`].
    /// Positions beyond the fixed-point range saturate to the outermost cell
    /// representable.
    #[must_use]
    pub fn world_to_cell(&self, world: Vec3Fixed) -> GridCoord {
        let local = world - self.origin;
        GridCoord::new(
            local
                .x
                .saturating_div(self.cell_size)
                .floor()
                .saturating_to_num::<i32>(),
            local
                .z
                .saturating_div(self.cell_size)
                .floor()
                .saturating_to_num::<i32>(),
        )
    }

    /// World position of a cell's corner (the inverse of [`Grid::world_to_cell`]).
    ///
    /// Saturates for coordinates whose corner lies beyond the fixed-point range.
    #[must_use]
    pub fn cell_to_world(&self, coord: GridCoord) -> Vec3Fixed {
        self.origin
            + Vec3Fixed::new(
                Fixed::from_num(coord.x).saturating_mul(self.cell_size),
                Fixed::ZERO,
                Fixed::from_num(coord.z).saturating_mul(self.cell_size),
            )
    }

    /// World position of a cell's center.
    #[must_use]
    pub fn cell_center(&self, coord: GridCoord) -> Vec3Fixed {
        let half = self.cell_size / Fixed::from_num(2);
        self.cell_to_world(coord) + Vec3Fixed::new(half, Fixed::ZERO, half)
    }

    /// Clamp a coordinate into `[0, width-1] × [0, height-1]`.
    #[must_use]
    pub fn validate_coordinate(&self, coord: GridCoord) -> GridCoord {
        GridCoord::new(
            coord.x.clamp(0, self.width as i32 - 1),
            coord.z.clamp(0, self.height as i32 - 1),
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cell_size", &self.cell_size)
            .field("origin", &self.origin)
            .field("cells", &self.cells.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
