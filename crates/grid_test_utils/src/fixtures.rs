//! Test fixtures and helpers.
//!
//! Pre-built grids, templates and building systems for consistent testing.

use fixed::types::I32F32;
use grid_core::building_system::BuildingSystem;
use grid_core::cell::Cell;
use grid_core::config::GridConfig;
use grid_core::data::TemplateRegistry;
use grid_core::footprint::FootprintTemplate;
use grid_core::grid::{Grid, GridCoord};
use grid_core::math::Vec3Fixed;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real grid code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// World position on the ground plane.
#[must_use]
pub fn world(x: i32, z: i32) -> Vec3Fixed {
    Vec3Fixed::from_ints(x, 0, z)
}

/// Shorthand for a cell coordinate.
#[must_use]
pub fn coord(x: i32, z: i32) -> GridCoord {
    GridCoord::new(x, z)
}

/// Empty grid with unit cells at the world origin.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> Grid<Cell> {
    Grid::with_empty_cells(width, height, fixed(1), Vec3Fixed::ZERO)
}

/// Grid with a blocked column at `x = width / 2`, open only at the top row.
///
/// Searches from the left half to the right half must detour through the
/// gap, which makes this the standard "hard" search fixture.
#[must_use]
pub fn walled_grid(width: u32, height: u32) -> Grid<Cell> {
    let mut grid = open_grid(width, height);
    let wall_x = (width / 2) as i32;
    for z in 0..(height as i32 - 1) {
        grid.set_walkable(coord(wall_x, z), false);
    }
    grid
}

/// The footprints used across tests.
///
/// - `tower`: 1×1
/// - `house`: 2×2
/// - `barracks`: 2×3
/// - `wall_corner`: 2×2 L-shape without the `(1, 0)` cell
#[must_use]
pub fn standard_templates() -> Vec<FootprintTemplate> {
    let build = |result: grid_core::error::Result<FootprintTemplate>| match result {
        Ok(template) => template,
        Err(err) => panic!("Fixture template is invalid: {err}"),
    };
    vec![
        build(FootprintTemplate::rectangle("tower", 1, 1)),
        build(FootprintTemplate::rectangle("house", 2, 2)),
        build(FootprintTemplate::rectangle("barracks", 2, 3)),
        build(FootprintTemplate::with_offsets(
            "wall_corner",
            2,
            2,
            vec![(0, 0), (0, 1), (1, 1)],
        )),
    ]
}

/// Registry holding [`standard_templates`].
///
/// # Panics
///
/// Panics if the fixture templates collide, which would be a bug here.
#[must_use]
pub fn standard_registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    for template in standard_templates() {
        if let Err(err) = registry.register(template) {
            panic!("Fixture registry is invalid: {err}");
        }
    }
    registry
}

/// Building system over a `width × height` grid of unit cells with the
/// standard templates registered.
///
/// # Panics
///
/// Panics on zero dimensions.
#[must_use]
pub fn building_system(width: u32, height: u32) -> BuildingSystem {
    let config = GridConfig {
        width,
        height,
        cell_size: 1,
        origin: (0, 0, 0),
    };
    match BuildingSystem::new(config, standard_registry()) {
        Ok(system) => system,
        Err(err) => panic!("Fixture building system is invalid: {err}"),
    }
}
