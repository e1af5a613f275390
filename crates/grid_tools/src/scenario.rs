//! Scenario loading and path queries.
//!
//! A scenario describes a grid, the templates available on it, the
//! buildings already standing and blocked terrain. Tools build a
//! [`BuildingSystem`] from it and run path queries or render it.

use std::path::Path;

use grid_core::building_system::BuildingSystem;
use grid_core::config::GridConfig;
use grid_core::data::{FootprintData, FootprintSet, TemplateRegistry};
use grid_core::footprint::Direction;
use grid_core::grid::GridCoord;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// A building standing at scenario start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPlacement {
    /// Template name.
    pub template: String,
    /// Origin cell.
    pub at: (i32, i32),
    /// Facing direction.
    #[serde(default)]
    pub direction: Direction,
}

/// A complete scenario configuration.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     name: "Gate",
///     grid: GridConfig(width: 8, height: 6, cell_size: 1),
///     templates: [
///         FootprintData(name: "wall", width: 1, height: 5),
///     ],
///     placements: [
///         ScenarioPlacement(template: "wall", at: (4, 0)),
///     ],
///     blocked: [(1, 1)],
///     path: Some(((0, 0), (7, 0))),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    #[serde(default)]
    pub name: String,
    /// Grid layout.
    #[serde(default)]
    pub grid: GridConfig,
    /// Available templates.
    #[serde(default)]
    pub templates: Vec<FootprintData>,
    /// Buildings placed in order at load.
    #[serde(default)]
    pub placements: Vec<ScenarioPlacement>,
    /// Cells blocked for pathfinding.
    #[serde(default)]
    pub blocked: Vec<(i32, i32)>,
    /// Default path query as `(from, to)`.
    #[serde(default)]
    pub path: Option<((i32, i32), (i32, i32))>,
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ToolError::NotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents, &path.display().to_string())
    }

    /// Parse a scenario from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParseError`] on malformed RON.
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| ToolError::ParseError {
            path: source.to_owned(),
            message: e.to_string(),
        })
    }

    /// Build the building system this scenario describes.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid config or templates, unknown template
    /// names, placements that do not fit, or blocked cells off the grid.
    pub fn build(&self) -> Result<BuildingSystem> {
        let registry = TemplateRegistry::from_set(FootprintSet {
            templates: self.templates.clone(),
        })?;
        let mut system = BuildingSystem::new(self.grid, registry)?;

        for placement in &self.placements {
            system.place(
                &placement.template,
                GridCoord::from(placement.at),
                placement.direction,
            )?;
        }
        for &cell in &self.blocked {
            system.set_walkable(GridCoord::from(cell), false)?;
        }

        tracing::info!(
            scenario = %self.name,
            placements = self.placements.len(),
            blocked = self.blocked.len(),
            "Scenario built"
        );
        Ok(system)
    }
}

/// Result of a path query, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathReport {
    /// Start cell.
    pub from: GridCoord,
    /// Goal cell.
    pub to: GridCoord,
    /// Whether a path exists.
    pub found: bool,
    /// Movement cost, 0 when not found.
    pub cost: u32,
    /// Cells from start to goal, empty when not found.
    pub cells: Vec<GridCoord>,
}

impl PathReport {
    /// One-line human-readable summary followed by the cell list.
    #[must_use]
    pub fn to_text(&self) -> String {
        if !self.found {
            return format!("No path from {} to {}", self.from, self.to);
        }
        let cells: Vec<String> = self.cells.iter().map(ToString::to_string).collect();
        format!(
            "Path from {} to {}: {} cells, cost {}\n{}",
            self.from,
            self.to,
            self.cells.len(),
            self.cost,
            cells.join(" -> ")
        )
    }

    /// Pretty JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run a path query. An unreachable goal is a report, not an error.
///
/// # Errors
///
/// Returns an error if an endpoint lies outside the grid.
pub fn query_path(system: &mut BuildingSystem, from: GridCoord, to: GridCoord) -> Result<PathReport> {
    match system.find_path(from, to) {
        Ok(path) => Ok(PathReport {
            from,
            to,
            found: true,
            cost: path.cost,
            cells: path.cells,
        }),
        Err(grid_core::error::GridError::NoPathFound { .. }) => Ok(PathReport {
            from,
            to,
            found: false,
            cost: 0,
            cells: Vec::new(),
        }),
        Err(e) => Err(e.into()),
    }
}
