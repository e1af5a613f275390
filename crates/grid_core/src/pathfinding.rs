//! Grid-based pathfinding using the A* algorithm.
//!
//! Costs are integers (10 per straight step, 14 per diagonal step) so
//! comparisons are exact and searches are reproducible. The octile distance
//! serves as both the edge cost and the heuristic.
//!
//! Search bookkeeping lives in a scratch buffer owned by the [`Pathfinder`],
//! indexed like the grid's cells, so the cells themselves only carry
//! durable state.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::grid::{Grid, GridCoord};
use crate::math::Vec3Fixed;

/// Cost of one orthogonal step.
pub const MOVE_STRAIGHT_COST: u32 = 10;

/// Cost of one diagonal step (10·√2, rounded).
pub const MOVE_DIAGONAL_COST: u32 = 14;

/// Cost-so-far of a cell the current search has not reached.
pub const UNREACHED: u32 = u32::MAX;

/// Neighbor offsets in expansion order.
///
/// The order decides which of several equal-cost paths is returned, so it
/// must not change: left column, right column, then up and down.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),  // Left
    (-1, -1), // Left down
    (-1, 1),  // Left up
    (1, 0),   // Right
    (1, -1),  // Right down
    (1, 1),   // Right up
    (0, 1),   // Up
    (0, -1),  // Down
];

/// Anything that can report whether a unit may stand on it.
pub trait Walkable {
    /// Returns true if pathfinding may traverse this cell.
    fn is_walkable(&self) -> bool;
}

impl Walkable for bool {
    fn is_walkable(&self) -> bool {
        *self
    }
}

/// Octile distance between two cells, scaled by the move costs.
#[must_use]
pub fn octile_distance(a: GridCoord, b: GridCoord) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dz = a.z.abs_diff(b.z);
    MOVE_DIAGONAL_COST
        .saturating_mul(dx.min(dz))
        .saturating_add(MOVE_STRAIGHT_COST.saturating_mul(dx.abs_diff(dz)))
}

/// Per-cell A* bookkeeping for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    /// Cost from the start (G).
    pub cost_from_start: u32,
    /// Estimated cost to the goal (H).
    pub heuristic: u32,
    /// G + H (F).
    pub total_cost: u32,
    /// Index of the cell this one was reached from.
    pub predecessor: Option<usize>,
}

impl SearchNode {
    /// Forget everything from a previous search.
    pub fn reset(&mut self) {
        self.cost_from_start = UNREACHED;
        self.heuristic = 0;
        self.total_cost = UNREACHED;
        self.predecessor = None;
    }

    /// Recompute F from G and H.
    pub fn calculate_total_cost(&mut self) {
        self.total_cost = self.cost_from_start.saturating_add(self.heuristic);
    }
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            cost_from_start: UNREACHED,
            heuristic: 0,
            total_cost: UNREACHED,
            predecessor: None,
        }
    }
}

/// A successful search result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathResult {
    /// Cells from start to goal, both included.
    pub cells: Vec<GridCoord>,
    /// Total movement cost along the path.
    pub cost: u32,
}

impl PathResult {
    /// Number of cells on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A found path always contains at least the start cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when the start already was the goal.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.cells.len() == 1
    }
}

/// A* pathfinder with a reusable scratch buffer.
///
/// Searching needs `&mut self` and only `&Grid`, so a search can never
/// overlap a grid mutation.
#[derive(Debug, Default)]
pub struct Pathfinder {
    /// Scratch state, one entry per grid cell.
    nodes: Vec<SearchNode>,
    /// Open list in insertion order; ties resolve to the earliest entry.
    open: Vec<usize>,
    /// Membership flags for `open`.
    in_open: Vec<bool>,
    /// Settled or excluded cells.
    closed: Vec<bool>,
}

impl Pathfinder {
    /// Create a pathfinder. The scratch buffer grows to fit the first grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch node for a cell index from the last search.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&SearchNode> {
        self.nodes.get(index)
    }

    /// Find a path between two cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if either endpoint is outside the
    /// grid and [`GridError::NoPathFound`] if the goal is unreachable.
    pub fn find_path<T: Walkable>(
        &mut self,
        grid: &Grid<T>,
        start: GridCoord,
        end: GridCoord,
    ) -> Result<PathResult> {
        let start_index = grid.index_of(start).ok_or(GridError::OutOfBounds(start))?;
        let end_index = grid.index_of(end).ok_or(GridError::OutOfBounds(end))?;

        self.reset(grid.len());

        let start_node = &mut self.nodes[start_index];
        start_node.cost_from_start = 0;
        start_node.heuristic = octile_distance(start, end);
        start_node.calculate_total_cost();
        self.push_open(start_index);

        while !self.open.is_empty() {
            let open_pos = self.lowest_total_cost();
            let current = self.open[open_pos];

            if current == end_index {
                let path = self.reconstruct_path(grid, end_index);
                tracing::debug!(
                    from = %start,
                    to = %end,
                    cost = path.cost,
                    steps = path.len(),
                    "Path found"
                );
                return Ok(path);
            }

            self.open.remove(open_pos);
            self.in_open[current] = false;
            self.closed[current] = true;

            let current_coord = grid.coord_of(current);
            let current_cost = self.nodes[current].cost_from_start;

            for &(dx, dz) in &NEIGHBOR_OFFSETS {
                let neighbor_coord = current_coord.offset(dx, dz);
                let Some(neighbor) = grid.index_of(neighbor_coord) else {
                    continue;
                };

                if self.closed[neighbor] {
                    continue;
                }

                // One look at an obstacle excludes it for the rest of this search.
                if !grid.get_by_index(neighbor).is_some_and(Walkable::is_walkable) {
                    self.closed[neighbor] = true;
                    continue;
                }

                let tentative = current_cost.saturating_add(octile_distance(current_coord, neighbor_coord));
                let node = &mut self.nodes[neighbor];
                if tentative < node.cost_from_start {
                    node.predecessor = Some(current);
                    node.cost_from_start = tentative;
                    node.heuristic = octile_distance(neighbor_coord, end);
                    node.calculate_total_cost();

                    if !self.in_open[neighbor] {
                        self.push_open(neighbor);
                    }
                }
            }
        }

        tracing::debug!(from = %start, to = %end, "No path found");
        Err(GridError::NoPathFound {
            from: start,
            to: end,
        })
    }

    /// Find a path between two world positions.
    ///
    /// Returns the centers of the cells along the path, for consumption by
    /// a movement controller.
    ///
    /// # Errors
    ///
    /// Same as [`Pathfinder::find_path`].
    pub fn find_world_path<T: Walkable>(
        &mut self,
        grid: &Grid<T>,
        start: Vec3Fixed,
        end: Vec3Fixed,
    ) -> Result<Vec<Vec3Fixed>> {
        let path = self.find_path(grid, grid.world_to_cell(start), grid.world_to_cell(end))?;
        Ok(path
            .cells
            .iter()
            .map(|&coord| grid.cell_center(coord))
            .collect())
    }

    /// Reset scratch state for every cell of a grid of `cell_count` cells.
    fn reset(&mut self, cell_count: usize) {
        self.nodes.resize(cell_count, SearchNode::default());
        for node in &mut self.nodes {
            node.reset();
        }

        self.in_open.clear();
        self.in_open.resize(cell_count, false);
        self.closed.clear();
        self.closed.resize(cell_count, false);
        self.open.clear();
    }

    fn push_open(&mut self, index: usize) {
        self.open.push(index);
        self.in_open[index] = true;
    }

    /// Position in `open` of the first entry with the minimum F.
    fn lowest_total_cost(&self) -> usize {
        let mut best = 0;
        for (pos, &index) in self.open.iter().enumerate().skip(1) {
            if self.nodes[index].total_cost < self.nodes[self.open[best]].total_cost {
                best = pos;
            }
        }
        best
    }

    /// Follow predecessor links from the goal back to the start.
    fn reconstruct_path<T>(&self, grid: &Grid<T>, end_index: usize) -> PathResult {
        let mut cells = vec![grid.coord_of(end_index)];
        let mut current = end_index;

        while let Some(prev) = self.nodes[current].predecessor {
            cells.push(grid.coord_of(prev));
            current = prev;
        }

        cells.reverse();
        PathResult {
            cells,
            cost: self.nodes[end_index].cost_from_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    fn open_grid(width: u32, height: u32) -> Grid<bool> {
        Grid::new(width, height, Fixed::from_num(1), Vec3Fixed::ZERO, |_| true)
    }

    fn block(grid: &mut Grid<bool>, x: i32, z: i32) {
        grid.update(GridCoord::new(x, z), |walkable| *walkable = false);
    }

    fn c(x: i32, z: i32) -> GridCoord {
        GridCoord::new(x, z)
    }

    fn path_cost(cells: &[GridCoord]) -> u32 {
        cells.windows(2).map(|w| octile_distance(w[0], w[1])).sum()
    }

    #[test]
    fn test_octile_distance() {
        assert_eq!(octile_distance(c(0, 0), c(0, 0)), 0);
        assert_eq!(octile_distance(c(0, 0), c(3, 0)), 30);
        assert_eq!(octile_distance(c(0, 0), c(2, 2)), 28);
        assert_eq!(octile_distance(c(0, 0), c(3, 7)), 14 * 3 + 10 * 4);
        assert_eq!(octile_distance(c(5, 1), c(1, 2)), 14 + 10 * 3);
    }

    #[test]
    fn test_search_node_reset_and_total() {
        let mut node = SearchNode {
            cost_from_start: 3,
            heuristic: 4,
            total_cost: 0,
            predecessor: Some(2),
        };
        node.calculate_total_cost();
        assert_eq!(node.total_cost, 7);

        node.reset();
        assert_eq!(node.cost_from_start, UNREACHED);
        assert_eq!(node.heuristic, 0);
        assert_eq!(node.predecessor, None);

        // Saturates instead of overflowing for unreached cells.
        node.heuristic = 10;
        node.calculate_total_cost();
        assert_eq!(node.total_cost, UNREACHED);
    }

    #[test]
    fn test_simple_diagonal_path() {
        let grid = open_grid(5, 5);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(&grid, c(0, 0), c(4, 4)).unwrap();

        assert_eq!(path.cells, vec![c(0, 0), c(1, 1), c(2, 2), c(3, 3), c(4, 4)]);
        assert_eq!(path.cost, 56);
    }

    #[test]
    fn test_path_to_same_cell() {
        let grid = open_grid(4, 4);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(&grid, c(2, 1), c(2, 1)).unwrap();

        assert_eq!(path.cells, vec![c(2, 1)]);
        assert_eq!(path.cost, 0);
        assert!(path.is_trivial());
    }

    #[test]
    fn test_routes_around_center_obstacle() {
        let mut grid = open_grid(3, 3);
        block(&mut grid, 1, 1);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(&grid, c(0, 0), c(2, 2)).unwrap();

        assert!(!path.cells.contains(&c(1, 1)));
        assert_eq!(path.cost, 34);
        assert_eq!(path.cost, path_cost(&path.cells));
        assert_eq!(path.cells.first(), Some(&c(0, 0)));
        assert_eq!(path.cells.last(), Some(&c(2, 2)));
    }

    #[test]
    fn test_path_around_wall() {
        let mut grid = open_grid(10, 10);
        for z in 2..8 {
            block(&mut grid, 5, z);
        }
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(&grid, c(2, 5), c(8, 5)).unwrap();

        for cell in &path.cells {
            assert!(
                *grid.get(*cell).unwrap(),
                "Path goes through blocked cell {cell}"
            );
        }
        assert_eq!(path.cost, path_cost(&path.cells));
    }

    #[test]
    fn test_no_path_exists() {
        let mut grid = open_grid(10, 10);
        for z in 0..10 {
            block(&mut grid, 5, z);
        }
        let mut pathfinder = Pathfinder::new();

        let result = pathfinder.find_path(&grid, c(2, 5), c(8, 5));

        assert_eq!(
            result,
            Err(GridError::NoPathFound {
                from: c(2, 5),
                to: c(8, 5)
            })
        );
    }

    #[test]
    fn test_enclosed_start_has_no_path() {
        let mut grid = open_grid(5, 5);
        for (x, z) in [(1, 1), (1, 2), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2), (3, 3)] {
            block(&mut grid, x, z);
        }
        let mut pathfinder = Pathfinder::new();

        let result = pathfinder.find_path(&grid, c(2, 2), c(0, 0));
        assert!(matches!(result, Err(GridError::NoPathFound { .. })));
    }

    #[test]
    fn test_blocked_goal_is_unreachable() {
        let mut grid = open_grid(5, 5);
        block(&mut grid, 4, 4);
        let mut pathfinder = Pathfinder::new();

        let result = pathfinder.find_path(&grid, c(0, 0), c(4, 4));
        assert!(matches!(result, Err(GridError::NoPathFound { .. })));
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let grid = open_grid(3, 3);
        let mut pathfinder = Pathfinder::new();

        assert_eq!(
            pathfinder.find_path(&grid, c(-1, 0), c(2, 2)),
            Err(GridError::OutOfBounds(c(-1, 0)))
        );
        assert_eq!(
            pathfinder.find_path(&grid, c(0, 0), c(3, 0)),
            Err(GridError::OutOfBounds(c(3, 0)))
        );
    }

    #[test]
    fn test_rectangular_grid_uses_height_bound() {
        // Wider than tall: the "up" neighbor must be clipped by height.
        let grid = open_grid(6, 2);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(&grid, c(0, 0), c(5, 1)).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.cost, 14 + 10 * 4);
    }

    #[test]
    fn test_scratch_reused_between_searches() {
        let mut grid = open_grid(6, 6);
        let mut pathfinder = Pathfinder::new();

        let first = pathfinder.find_path(&grid, c(0, 0), c(5, 5)).unwrap();
        block(&mut grid, 3, 3);
        let second = pathfinder.find_path(&grid, c(0, 0), c(5, 5)).unwrap();
        let again = pathfinder.find_path(&grid, c(0, 0), c(5, 5)).unwrap();

        assert_eq!(first.cost, 70);
        assert!(!second.cells.contains(&c(3, 3)));
        assert_eq!(second, again);
    }

    #[test]
    fn test_determinism() {
        let mut grid = open_grid(20, 20);
        for i in 5..15 {
            block(&mut grid, 10, i);
        }

        let path1 = Pathfinder::new().find_path(&grid, c(5, 10), c(15, 10)).unwrap();
        let path2 = Pathfinder::new().find_path(&grid, c(5, 10), c(15, 10)).unwrap();
        let path3 = Pathfinder::new().find_path(&grid, c(5, 10), c(15, 10)).unwrap();

        assert_eq!(path1, path2);
        assert_eq!(path2, path3);
    }

    #[test]
    fn test_world_path_returns_cell_centers() {
        let grid = Grid::new(
            4,
            4,
            Fixed::from_num(2),
            Vec3Fixed::from_ints(10, 0, 10),
            |_| true,
        );
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder
            .find_world_path(
                &grid,
                Vec3Fixed::from_ints(10, 0, 10),
                Vec3Fixed::from_ints(15, 0, 11),
            )
            .unwrap();

        assert_eq!(
            path,
            vec![
                Vec3Fixed::from_ints(11, 0, 11),
                Vec3Fixed::from_ints(13, 0, 11),
                Vec3Fixed::from_ints(15, 0, 11),
            ]
        );
    }
}
