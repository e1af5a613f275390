//! Property tests for conversion, rotation, placement and search.

use grid_core::footprint::{rotate_quarter, Direction};
use grid_core::math::{Fixed, Vec3Fixed};
use grid_core::pathfinding::{octile_distance, Pathfinder};
use grid_core::placement::PlacementEngine;
use grid_test_utils::determinism::grid_hash;
use grid_test_utils::determinism::strategies::{
    arb_coord_in, arb_coord_outside, arb_direction, arb_grid_and_coord, arb_grid_size,
    arb_template,
};
use grid_test_utils::fixtures::{coord, open_grid};
use grid_test_utils::proptest::prelude::*;

proptest! {
    /// Every in-bounds cell maps to a world corner that maps straight back.
    #[test]
    fn world_cell_round_trip(((w, h), c) in arb_grid_and_coord(40)) {
        let grid = open_grid(w, h);
        prop_assert_eq!(grid.world_to_cell(grid.cell_to_world(c)), c);
        prop_assert_eq!(grid.world_to_cell(grid.cell_center(c)), c);
    }

    /// Out-of-range lookups are absent, never a panic.
    #[test]
    fn out_of_range_get_is_none(
        (w, h, c) in arb_grid_size(20)
            .prop_flat_map(|(w, h)| (Just(w), Just(h), arb_coord_outside(w, h)))
    ) {
        let grid = open_grid(w, h);
        prop_assert!(grid.get(c).is_none());
        prop_assert!(!grid.can_build(c));
    }

    /// Any world position converts to some cell, and any cell to some world
    /// position, without overflowing; footprints far off the grid never check
    /// valid.
    #[test]
    fn extreme_positions_are_out_of_range(
        x in any::<i64>(),
        z in any::<i64>(),
        template in arb_template(4),
        direction in arb_direction(),
    ) {
        let grid = open_grid(8, 8);
        let world = Vec3Fixed::new(Fixed::from_bits(x), Fixed::ZERO, Fixed::from_bits(z));
        let cell = grid.world_to_cell(world);
        let _ = grid.cell_center(cell);

        let engine = PlacementEngine::new();
        // Farther from the grid than any footprint reaches.
        if cell.x.unsigned_abs() > 16 || cell.z.unsigned_abs() > 16 {
            prop_assert!(!engine.can_place(&grid, &template, cell, direction));
        }
    }

    /// Corner to corner on an empty grid costs exactly the octile distance.
    #[test]
    fn open_grid_corner_path((w, h) in arb_grid_size(24)) {
        let grid = open_grid(w, h);
        let end = coord(w as i32 - 1, h as i32 - 1);
        let path = Pathfinder::new().find_path(&grid, coord(0, 0), end).unwrap();

        let (dx, dz) = (w - 1, h - 1);
        prop_assert_eq!(path.len(), w.max(h) as usize);
        prop_assert_eq!(path.cost, 14 * dx.min(dz) + 10 * dx.abs_diff(dz));
        prop_assert_eq!(path.cost, octile_distance(coord(0, 0), end));
    }

    /// Any two cells of an empty grid are connected at octile cost.
    #[test]
    fn open_grid_any_pair(
        (w, h, a, b) in arb_grid_size(16).prop_flat_map(|(w, h)| {
            (Just(w), Just(h), arb_coord_in(w, h), arb_coord_in(w, h))
        })
    ) {
        let grid = open_grid(w, h);
        let path = Pathfinder::new().find_path(&grid, a, b).unwrap();
        prop_assert_eq!(path.cells.first(), Some(&a));
        prop_assert_eq!(path.cells.last(), Some(&b));
        prop_assert_eq!(path.cost, octile_distance(a, b));
        for pair in path.cells.windows(2) {
            prop_assert!((pair[0].x - pair[1].x).abs() <= 1);
            prop_assert!((pair[0].z - pair[1].z).abs() <= 1);
        }
    }

    /// Four quarter turns bring every offset back where it started.
    #[test]
    fn four_quarter_turns_restore(template in arb_template(5)) {
        for &offset in template.offsets() {
            let (w, h) = (template.width(), template.height());
            let once = rotate_quarter(offset, w);
            let twice = rotate_quarter(once, h);
            let thrice = rotate_quarter(twice, w);
            prop_assert_eq!(rotate_quarter(thrice, h), offset);
        }
    }

    /// Rotated footprints stay inside their rotated box and keep their size.
    #[test]
    fn rotated_offsets_stay_in_box(template in arb_template(5), direction in arb_direction()) {
        let (rw, rh) = direction.rotated_size(template.width(), template.height());
        let rotated = template.rotated_offsets(direction);
        prop_assert_eq!(rotated.len(), template.offsets().len());
        for (dx, dz) in rotated {
            prop_assert!(dx >= 0 && dx < rw as i32);
            prop_assert!(dz >= 0 && dz < rh as i32);
        }
    }

    /// Placing and then removing a footprint restores the grid.
    #[test]
    fn place_then_remove_restores(
        template in arb_template(4),
        direction in arb_direction(),
        origin in arb_coord_in(12, 12),
    ) {
        let mut grid = open_grid(12, 12);
        let before = grid_hash(&grid);
        let mut engine = PlacementEngine::new();

        if let Ok(id) = engine.place(&mut grid, &template, origin, direction) {
            for cell in template.cells_at(origin, direction) {
                prop_assert!(!grid.can_build(cell));
                prop_assert!(!grid.is_walkable(cell));
            }
            engine.remove(&mut grid, id);
        }
        prop_assert_eq!(grid_hash(&grid), before);
    }

    /// A second footprint over the first is always rejected.
    #[test]
    fn overlapping_placement_rejected(
        template in arb_template(4),
        direction in arb_direction(),
    ) {
        let mut grid = open_grid(10, 10);
        let mut engine = PlacementEngine::new();
        let origin = coord(3, 3);
        engine.place(&mut grid, &template, origin, direction).unwrap();

        let result = engine.place(&mut grid, &template, origin, direction);
        prop_assert!(result.is_err());
        prop_assert_eq!(engine.len(), 1);
    }
}

#[test]
fn direction_cycle_has_period_four() {
    let mut direction = Direction::Down;
    for _ in 0..4 {
        direction = direction.next();
    }
    assert_eq!(direction, Direction::Down);
}
