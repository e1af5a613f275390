//! Determinism testing utilities.
//!
//! Provides a harness for verifying that searches and placements produce
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Paths feed lockstep unit movement, so every client must compute the same
//! path for the same grid. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`grid_core::math::Fixed`] throughout.
//!
//! - **Tie-breaking**: Equal-cost open nodes must always be picked in the
//!   same order. The pathfinder scans its open list in insertion order.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Placements and templates live in `BTreeMap`s.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use grid_core::building_system::BuildingSystem;
use grid_core::cell::Cell;
use grid_core::grid::{Grid, GridCoord};
use grid_core::pathfinding::{PathResult, Pathfinder};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
        Self {
            is_deterministic,
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic operation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Operation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run an operation on fresh state several times and compare hashes.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `setup` - Function to create initial state
/// * `run` - Function performing the operation under test
/// * `hash` - Function to compute a state hash afterwards
pub fn verify_determinism<S, Setup, Run, HashFn>(
    runs: usize,
    setup: Setup,
    run: Run,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Run: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes = (0..runs)
        .map(|_| {
            let mut state = setup();
            run(&mut state);
            hash(&state)
        })
        .collect();

    DeterminismResult::from_hashes(hashes)
}

/// Search the same grid `runs` times, reusing one pathfinder, and compare
/// the outcomes.
///
/// Reusing the pathfinder also checks that scratch state from one search
/// never leaks into the next.
///
/// # Example
///
/// ```
/// use grid_test_utils::determinism::verify_path_determinism;
/// use grid_test_utils::fixtures::{coord, walled_grid};
///
/// let grid = walled_grid(16, 16);
/// verify_path_determinism(&grid, coord(0, 0), coord(15, 0), 5).assert_deterministic();
/// ```
#[must_use]
pub fn verify_path_determinism(
    grid: &Grid<Cell>,
    start: GridCoord,
    end: GridCoord,
    runs: usize,
) -> DeterminismResult {
    let mut pathfinder = Pathfinder::new();
    let hashes = (0..runs)
        .map(|_| hash_search(&pathfinder.find_path(grid, start, end)))
        .collect();
    DeterminismResult::from_hashes(hashes)
}

/// Run the same search on `num_runs` scoped threads, each with its own grid.
///
/// Grids hold non-`Send` listeners, so each thread builds its own from
/// `setup_fn`.
///
/// # Panics
///
/// Panics if a search thread panics.
#[must_use]
pub fn run_parallel_searches_scoped<F>(
    setup_fn: F,
    start: GridCoord,
    end: GridCoord,
    num_runs: usize,
) -> DeterminismResult
where
    F: Fn() -> Grid<Cell> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let grid = setup_fn();
                    hash_search(&Pathfinder::new().find_path(&grid, start, end))
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult::from_hashes(hashes)
}

/// Verify that a save/load round trip preserves the grid exactly.
///
/// Saves `system`, loads the snapshot into a fresh system from `fresh`,
/// and compares the occupancy and walkability of every cell.
pub fn verify_snapshot_round_trip<F>(system: &BuildingSystem, fresh: F) -> bool
where
    F: FnOnce() -> BuildingSystem,
{
    let snapshot = system.save();
    let mut restored = fresh();
    if restored.load(&snapshot).is_err() {
        return false;
    }
    grid_hash(system.grid()) == grid_hash(restored.grid())
}

/// Hash the build and walk state of every cell.
///
/// Placement ids are left out, since a reload hands out new ones.
#[must_use]
pub fn grid_hash(grid: &Grid<Cell>) -> u64 {
    use grid_core::pathfinding::Walkable;

    let mut hasher = DefaultHasher::new();
    grid.width().hash(&mut hasher);
    grid.height().hash(&mut hasher);
    for (coord, cell) in grid.iter() {
        coord.hash(&mut hasher);
        cell.can_build().hash(&mut hasher);
        cell.is_walkable().hash(&mut hasher);
        cell.terrain_walkable().hash(&mut hasher);
    }
    hasher.finish()
}

fn hash_search(result: &grid_core::error::Result<PathResult>) -> u64 {
    match result {
        Ok(path) => compute_hash(path),
        Err(err) => compute_hash(&err.to_string()),
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for grid testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based tests of conversion, rotation and search.
pub mod strategies {
    use grid_core::footprint::{Direction, FootprintTemplate};
    use grid_core::grid::GridCoord;
    use proptest::prelude::*;

    /// Generate a facing direction.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    /// Generate grid dimensions up to `max` cells per side.
    pub fn arb_grid_size(max: u32) -> impl Strategy<Value = (u32, u32)> {
        (1..=max, 1..=max)
    }

    /// Generate an in-bounds coordinate for a `width × height` grid.
    pub fn arb_coord_in(width: u32, height: u32) -> impl Strategy<Value = GridCoord> {
        (0..width as i32, 0..height as i32).prop_map(|(x, z)| GridCoord::new(x, z))
    }

    /// Generate a grid size together with an in-bounds coordinate.
    pub fn arb_grid_and_coord(max: u32) -> impl Strategy<Value = ((u32, u32), GridCoord)> {
        arb_grid_size(max)
            .prop_flat_map(|(w, h)| (Just((w, h)), arb_coord_in(w, h)))
    }

    /// Generate a coordinate outside a `width × height` grid.
    pub fn arb_coord_outside(width: u32, height: u32) -> impl Strategy<Value = GridCoord> {
        let (w, h) = (width as i32, height as i32);
        prop_oneof![
            (-50..0, -50..h + 50).prop_map(|(x, z)| GridCoord::new(x, z)),
            (w..w + 50, -50..h + 50).prop_map(|(x, z)| GridCoord::new(x, z)),
            (0..w, -50..0).prop_map(|(x, z)| GridCoord::new(x, z)),
            (0..w, h..h + 50).prop_map(|(x, z)| GridCoord::new(x, z)),
        ]
    }

    /// Generate a footprint: a random non-empty subset of a box up to
    /// `max × max`.
    pub fn arb_template(max: u32) -> impl Strategy<Value = FootprintTemplate> {
        (1..=max, 1..=max)
            .prop_flat_map(|(w, h)| {
                let cells = (w * h) as usize;
                (
                    Just((w, h)),
                    prop::collection::vec(any::<bool>(), cells),
                    0..cells,
                )
            })
            .prop_map(|((w, h), mask, forced)| {
                let offsets: Vec<(i32, i32)> = (0..w as i32)
                    .flat_map(|x| (0..h as i32).map(move |z| (x, z)))
                    .enumerate()
                    .filter(|&(i, _)| mask[i] || i == forced)
                    .map(|(_, offset)| offset)
                    .collect();
                match FootprintTemplate::with_offsets("generated", w, h, offsets) {
                    Ok(template) => template,
                    Err(err) => panic!("Generated template is invalid: {err}"),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{building_system, coord, open_grid, walled_grid};
    use grid_core::footprint::Direction;

    #[test]
    fn test_path_search_is_deterministic() {
        let grid = walled_grid(12, 12);
        let result = verify_path_determinism(&grid, coord(0, 0), coord(11, 0), 4);
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_parallel_searches_match() {
        let result = run_parallel_searches_scoped(|| walled_grid(10, 10), coord(0, 0), coord(9, 9), 4);
        assert_eq!(result.hashes.len(), 4);
        result.assert_deterministic();
    }

    #[test]
    fn test_placement_sequence_is_deterministic() {
        let result = verify_determinism(
            3,
            || building_system(8, 8),
            |system| {
                let _ = system.place("house", coord(0, 0), Direction::Down);
                let _ = system.place("barracks", coord(3, 3), Direction::Right);
                let _ = system.place("house", coord(1, 1), Direction::Down);
            },
            |system| grid_hash(system.grid()),
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_grid_hash_sees_changes() {
        let mut grid = open_grid(4, 4);
        let before = grid_hash(&grid);
        grid.set_walkable(coord(2, 2), false);
        assert_ne!(grid_hash(&grid), before);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut system = building_system(8, 8);
        system.place("wall_corner", coord(2, 2), Direction::Up).unwrap();
        system.place("tower", coord(7, 7), Direction::Down).unwrap();
        assert!(verify_snapshot_round_trip(&system, || building_system(8, 8)));
    }
}
