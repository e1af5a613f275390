//! The building system facade.
//!
//! [`BuildingSystem`] owns everything a host needs to drive grid building:
//! the grid itself, the placement engine, the template registry, a
//! pathfinder, and the interactive state (build mode, selected template,
//! facing direction). The host owns exactly one and feeds it world
//! positions from its own raycasting.
//!
//! # Example
//!
//! ```
//! use grid_core::prelude::*;
//!
//! let mut registry = TemplateRegistry::new();
//! registry
//!     .register(FootprintTemplate::rectangle("house", 2, 2).unwrap())
//!     .unwrap();
//!
//! let mut system = BuildingSystem::new(GridConfig::default(), registry).unwrap();
//! system.set_building_mode(true);
//! system.select_template("house").unwrap();
//!
//! let outcome = system.place_at(Vec3Fixed::from_ints(12, 0, 12));
//! assert!(matches!(outcome, PlacementOutcome::Placed(_)));
//! ```

use crate::cell::{Cell, PlacementId};
use crate::config::GridConfig;
use crate::data::TemplateRegistry;
use crate::error::{GridError, Result};
use crate::footprint::{Direction, FootprintTemplate};
use crate::grid::{Grid, GridCoord};
use crate::math::Vec3Fixed;
use crate::pathfinding::{PathResult, Pathfinder};
use crate::persistence::{CellRecord, GridSnapshot, SNAPSHOT_VERSION};
use crate::placement::{snapped_position, Placement, PlacementEngine, PlacementPreview};

/// Callback invoked when build mode is toggled.
pub type ModeListener = Box<dyn FnMut(bool)>;

/// Callback invoked with the newly selected template name.
pub type SelectionListener = Box<dyn FnMut(Option<&str>)>;

/// Result of one placement attempt at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The footprint was committed.
    Placed(PlacementId),
    /// A covered cell is occupied or outside the grid.
    CannotBuild {
        /// Anchor cell of the rejected attempt.
        at: GridCoord,
    },
    /// Build mode is off or no template is selected.
    Inactive,
}

/// Summary of a snapshot replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Placements recreated.
    pub restored: usize,
    /// Records skipped because an earlier replay already covered the cell.
    pub skipped: usize,
    /// Records off the grid, with an unknown template, or whose replay was
    /// rejected.
    pub failed: usize,
}

/// Owner of the grid and all building state.
pub struct BuildingSystem {
    config: GridConfig,
    grid: Grid<Cell>,
    placements: PlacementEngine,
    pathfinder: Pathfinder,
    registry: TemplateRegistry,
    building_mode: bool,
    selected: Option<String>,
    direction: Direction,
    mode_listeners: Vec<ModeListener>,
    selection_listeners: Vec<SelectionListener>,
}

impl BuildingSystem {
    /// Create a system with an empty grid built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] if the config cannot build a grid.
    pub fn new(config: GridConfig, registry: TemplateRegistry) -> Result<Self> {
        config.validate()?;
        let grid = Grid::with_empty_cells(
            config.width,
            config.height,
            config.cell_size_fixed(),
            config.origin_vec(),
        );
        tracing::info!(
            width = config.width,
            height = config.height,
            cell_size = config.cell_size,
            templates = registry.len(),
            "Building system created"
        );

        Ok(Self {
            config,
            grid,
            placements: PlacementEngine::new(),
            pathfinder: Pathfinder::new(),
            registry,
            building_mode: false,
            selected: None,
            direction: Direction::default(),
            mode_listeners: Vec::new(),
            selection_listeners: Vec::new(),
        })
    }

    /// Config the system was built from.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The building grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid<Cell> {
        &self.grid
    }

    /// Known templates.
    #[must_use]
    pub const fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Live placements.
    #[must_use]
    pub const fn placements(&self) -> &PlacementEngine {
        &self.placements
    }

    // ========================================================================
    // Build mode
    // ========================================================================

    /// Whether clicks place and remove buildings.
    #[must_use]
    pub const fn is_building_mode(&self) -> bool {
        self.building_mode
    }

    /// Enter or leave build mode. Listeners hear only actual changes.
    pub fn set_building_mode(&mut self, enabled: bool) {
        if self.building_mode == enabled {
            return;
        }
        self.building_mode = enabled;
        tracing::debug!(enabled, "Building mode changed");
        for listener in &mut self.mode_listeners {
            listener(enabled);
        }
    }

    /// Flip build mode and return the new state.
    pub fn toggle_building_mode(&mut self) -> bool {
        self.set_building_mode(!self.building_mode);
        self.building_mode
    }

    /// Register a build mode listener.
    pub fn on_building_mode_changed<F>(&mut self, listener: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.mode_listeners.push(Box::new(listener));
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select the template that [`BuildingSystem::place_at`] builds.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownTemplate`] if the registry has no such
    /// template; the previous selection is kept.
    pub fn select_template(&mut self, name: &str) -> Result<()> {
        self.registry.require(name)?;
        self.selected = Some(name.to_owned());
        self.notify_selection();
        Ok(())
    }

    /// Drop the current selection.
    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.notify_selection();
        }
    }

    /// Name of the selected template.
    #[must_use]
    pub fn selected_template(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Register a selection listener.
    pub fn on_selection_changed<F>(&mut self, listener: F)
    where
        F: FnMut(Option<&str>) + 'static,
    {
        self.selection_listeners.push(Box::new(listener));
    }

    fn notify_selection(&mut self) {
        let selected = self.selected.as_deref();
        for listener in &mut self.selection_listeners {
            listener(selected);
        }
    }

    /// Current facing direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Turn the facing direction one step and return it.
    pub fn rotate(&mut self) -> Direction {
        self.direction = self.direction.next();
        self.direction
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Where the selected building's pivot would sit for a cursor at `world`.
    ///
    /// Without a selection the input is returned unchanged.
    #[must_use]
    pub fn snapped_world_position(&self, world: Vec3Fixed) -> Vec3Fixed {
        match self.selected_template_data() {
            Some(template) => snapped_position(
                &self.grid,
                template,
                self.grid.world_to_cell(world),
                self.direction,
            ),
            None => world,
        }
    }

    /// Yaw of the selected building in degrees, 0 without a selection.
    #[must_use]
    pub fn current_rotation_angle(&self) -> u32 {
        if self.selected.is_some() {
            self.direction.rotation_angle()
        } else {
            0
        }
    }

    /// Ghost-building data for a cursor at `world`.
    #[must_use]
    pub fn preview(&self, world: Vec3Fixed) -> Option<PlacementPreview> {
        let template = self.selected_template_data()?;
        Some(PlacementPreview::new(
            &self.grid,
            template,
            self.grid.world_to_cell(world),
            self.direction,
        ))
    }

    fn selected_template_data(&self) -> Option<&FootprintTemplate> {
        self.selected
            .as_deref()
            .and_then(|name| self.registry.get(name))
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Place the selected template under the cursor, facing the current
    /// direction. Does nothing outside build mode.
    pub fn place_at(&mut self, world: Vec3Fixed) -> PlacementOutcome {
        if !self.building_mode {
            return PlacementOutcome::Inactive;
        }
        let Some(name) = self.selected.clone() else {
            return PlacementOutcome::Inactive;
        };

        let at = self.grid.world_to_cell(world);
        match self.place(&name, at, self.direction) {
            Ok(id) => PlacementOutcome::Placed(id),
            Err(err) => {
                tracing::warn!(template = %name, %at, %err, "Cannot build here");
                PlacementOutcome::CannotBuild { at }
            }
        }
    }

    /// Remove the building under the cursor. Does nothing outside build mode.
    pub fn remove_at(&mut self, world: Vec3Fixed) -> Option<Placement> {
        if !self.building_mode {
            return None;
        }
        let coord = self.grid.world_to_cell(world);
        let id = self.grid.get(coord).and_then(Cell::occupant)?;
        self.placements.remove(&mut self.grid, id)
    }

    /// Place a named template with its origin at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownTemplate`] for unregistered names and
    /// [`GridError::NotBuildable`] if the footprint does not fit.
    pub fn place(
        &mut self,
        template: &str,
        origin: GridCoord,
        direction: Direction,
    ) -> Result<PlacementId> {
        let template = self.registry.require(template)?;
        self.placements
            .place(&mut self.grid, template, origin, direction)
    }

    /// Remove a placement by id.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::PlacementNotFound`] for unknown ids.
    pub fn remove(&mut self, id: PlacementId) -> Result<Placement> {
        self.placements
            .remove(&mut self.grid, id)
            .ok_or(GridError::PlacementNotFound(id))
    }

    /// Block or unblock terrain for pathfinding.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn set_walkable(&mut self, coord: GridCoord, walkable: bool) -> Result<()> {
        if self.grid.set_walkable(coord, walkable) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds(coord))
        }
    }

    /// Find a path between two cells.
    ///
    /// # Errors
    ///
    /// See [`Pathfinder::find_path`].
    pub fn find_path(&mut self, start: GridCoord, end: GridCoord) -> Result<PathResult> {
        self.pathfinder.find_path(&self.grid, start, end)
    }

    /// Find a path between two world positions, as cell centers.
    ///
    /// # Errors
    ///
    /// See [`Pathfinder::find_path`].
    pub fn find_world_path(&mut self, start: Vec3Fixed, end: Vec3Fixed) -> Result<Vec<Vec3Fixed>> {
        self.pathfinder.find_world_path(&self.grid, start, end)
    }

    /// Register a cell change listener on the grid.
    ///
    /// Listeners survive [`BuildingSystem::load`].
    pub fn subscribe_cell_changes<F>(&mut self, listener: F)
    where
        F: FnMut(GridCoord) + 'static,
    {
        self.grid.subscribe(listener);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Record every cell with the template and facing of its occupant.
    #[must_use]
    pub fn save(&self) -> GridSnapshot {
        let cells = self
            .grid
            .iter()
            .map(|(coord, cell)| {
                let mut record = CellRecord::empty(coord.x, coord.z);
                record.walkable = cell.terrain_walkable();
                if let Some(placement) = self.placements.placement_at(&self.grid, coord) {
                    record.template = Some(placement.template.clone());
                    record.direction = Some(placement.direction);
                }
                record
            })
            .collect();

        tracing::info!(placements = self.placements.len(), "Grid saved");
        GridSnapshot {
            version: SNAPSHOT_VERSION,
            width: self.grid.width(),
            height: self.grid.height(),
            cell_size: self.grid.cell_size(),
            cells,
        }
    }

    /// Discard all building state and rebuild it from a snapshot.
    ///
    /// The grid is recreated with the snapshot's size and cell size at the
    /// configured origin, then each footprint is placed again. Cell change
    /// listeners move to the new grid and hear the replay.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`GridSnapshot::validate`]; the current state
    /// is untouched in that case. Individual bad records do not fail the
    /// load, they are counted in the [`LoadReport`].
    pub fn load(&mut self, snapshot: &GridSnapshot) -> Result<LoadReport> {
        snapshot.validate()?;

        let listeners = self.grid.take_listeners();
        self.placements = PlacementEngine::new();
        self.pathfinder = Pathfinder::new();
        self.grid = Grid::with_empty_cells(
            snapshot.width,
            snapshot.height,
            snapshot.cell_size,
            self.config.origin_vec(),
        );
        for listener in listeners {
            self.grid.subscribe_boxed(listener);
        }

        for record in &snapshot.cells {
            if !record.walkable && !self.grid.set_walkable(record.coord(), false) {
                tracing::warn!(coord = %record.coord(), "Ignored terrain record off the grid");
            }
        }

        let mut report = LoadReport::default();
        for record in snapshot.occupied_records() {
            let coord = record.coord();
            if !self.grid.in_bounds(coord) {
                tracing::warn!(%coord, "Dropped saved building off the grid");
                report.failed += 1;
                continue;
            }
            if !self.grid.can_build(coord) {
                report.skipped += 1;
                continue;
            }
            match self.replay(record) {
                Ok(_) => report.restored += 1,
                Err(err) => {
                    tracing::warn!(%coord, %err, "Dropped saved building");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            restored = report.restored,
            skipped = report.skipped,
            failed = report.failed,
            "Grid loaded"
        );
        Ok(report)
    }

    /// Place the footprint whose lowest cell is `record`'s cell.
    fn replay(&mut self, record: &CellRecord) -> Result<PlacementId> {
        let name = record.template.as_deref().unwrap_or_default();
        let template = self.registry.require(name)?;
        let direction = record.direction.unwrap_or_default();
        let (ax, az) = template.anchor_offset(direction);
        let origin = record.coord().offset(-ax, -az);
        self.placements
            .place(&mut self.grid, template, origin, direction)
    }
}

impl std::fmt::Debug for BuildingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildingSystem")
            .field("config", &self.config)
            .field("grid", &self.grid)
            .field("placements", &self.placements.len())
            .field("building_mode", &self.building_mode)
            .field("selected", &self.selected)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
