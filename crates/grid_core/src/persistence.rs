//! Persisted grid state.
//!
//! A [`GridSnapshot`] lists every cell with the template name and facing of
//! the building covering it. Loading replays placement from those records;
//! see [`BuildingSystem::load`](crate::building_system::BuildingSystem::load).
//! Where the bytes end up is the host's business.

use serde::{Deserialize, Serialize};

use crate::config::check_dimensions;
use crate::error::{GridError, Result};
use crate::footprint::Direction;
use crate::grid::GridCoord;
use crate::math::{fixed_serde, Fixed};

/// Snapshot format version for compatibility.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted state of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Column.
    pub x: i32,
    /// Row.
    pub z: i32,
    /// Template of the building covering this cell.
    #[serde(default)]
    pub template: Option<String>,
    /// Facing of the building covering this cell.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Terrain walkability, independent of any building on the cell.
    #[serde(default = "default_true")]
    pub walkable: bool,
}

impl CellRecord {
    /// An empty, walkable cell.
    #[must_use]
    pub const fn empty(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            template: None,
            direction: None,
            walkable: true,
        }
    }

    /// Coordinate of this record.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        GridCoord::new(self.x, self.z)
    }

    /// True if a building covered this cell.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.template.as_deref().is_some_and(|name| !name.is_empty())
    }
}

const fn default_true() -> bool {
    true
}

/// Complete persisted grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell size in world units.
    #[serde(with = "fixed_serde")]
    pub cell_size: Fixed,
    /// One record per cell, x-major.
    pub cells: Vec<CellRecord>,
}

impl GridSnapshot {
    /// Records of cells covered by a building, in `(x, z)` order.
    ///
    /// A footprint's origin is its lowest `(x, z)` cell, so it comes before
    /// the rest of its footprint in this order.
    #[must_use]
    pub fn occupied_records(&self) -> Vec<&CellRecord> {
        let mut records: Vec<&CellRecord> =
            self.cells.iter().filter(|r| r.is_occupied()).collect();
        records.sort_by_key(|r| r.coord());
        records
    }

    /// Check the version, dimensions and record count.
    ///
    /// Record coordinates are not checked here; loading counts records off
    /// the grid as failures.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::VersionMismatch`] for other versions and
    /// [`GridError::InvalidConfig`] for unusable dimensions or more records
    /// than cells.
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(GridError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        check_dimensions(self.width, self.height)?;
        let cell_count = u64::from(self.width) * u64::from(self.height);
        if self.cells.len() as u64 > cell_count {
            return Err(GridError::InvalidConfig(format!(
                "snapshot has {} records for {cell_count} cells",
                self.cells.len()
            )));
        }
        if self.cell_size <= Fixed::ZERO {
            return Err(GridError::InvalidConfig(format!(
                "snapshot cell size {} must be positive",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// Encode as human-readable RON.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Serialization`] if encoding fails.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GridError::Serialization(format!("Failed to encode snapshot: {e}")))
    }

    /// Decode from RON and validate.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Serialization`] on malformed input, plus the
    /// errors of [`GridSnapshot::validate`].
    pub fn from_ron(text: &str) -> Result<Self> {
        let snapshot: Self = ron::from_str(text)
            .map_err(|e| GridError::Serialization(format!("Failed to decode snapshot: {e}")))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encode as compact binary.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GridError::Serialization(format!("Failed to encode snapshot: {e}")))
    }

    /// Decode from binary and validate.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Serialization`] on malformed input, plus the
    /// errors of [`GridSnapshot::validate`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| GridError::Serialization(format!("Failed to decode snapshot: {e}")))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> GridSnapshot {
        let mut cells = Vec::new();
        for x in 0..3 {
            for z in 0..2 {
                cells.push(CellRecord::empty(x, z));
            }
        }
        cells[3].template = Some("house".into());
        cells[3].direction = Some(Direction::Up);
        cells[5].walkable = false;

        GridSnapshot {
            version: SNAPSHOT_VERSION,
            width: 3,
            height: 2,
            cell_size: Fixed::from_num(5),
            cells,
        }
    }

    #[test]
    fn test_ron_round_trip() {
        let original = snapshot();
        let text = original.to_ron().unwrap();
        assert!(text.contains("house"));
        assert_eq!(GridSnapshot::from_ron(&text).unwrap(), original);
    }

    #[test]
    fn test_bytes_round_trip() {
        let original = snapshot();
        let bytes = original.to_bytes().unwrap();
        assert_eq!(GridSnapshot::from_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut old = snapshot();
        old.version = 0;
        let bytes = old.to_bytes().unwrap();
        assert_eq!(
            GridSnapshot::from_bytes(&bytes),
            Err(GridError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: 0
            })
        );
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(
            GridSnapshot::from_bytes(&[1, 2, 3]),
            Err(GridError::Serialization(_))
        ));
        assert!(matches!(
            GridSnapshot::from_ron("not a snapshot"),
            Err(GridError::Serialization(_))
        ));
    }

    #[test]
    fn test_huge_dimensions_rejected() {
        let mut huge = snapshot();
        huge.width = i32::MAX as u32;
        huge.height = i32::MAX as u32;
        let bytes = huge.to_bytes().unwrap();
        assert!(matches!(
            GridSnapshot::from_bytes(&bytes),
            Err(GridError::InvalidConfig(_))
        ));
        assert!(matches!(huge.validate(), Err(GridError::InvalidConfig(_))));
    }

    #[test]
    fn test_too_many_records_rejected() {
        let mut crowded = snapshot();
        crowded.cells.push(CellRecord::empty(0, 0));
        assert!(matches!(crowded.validate(), Err(GridError::InvalidConfig(_))));

        let mut sparse = snapshot();
        sparse.cells.truncate(2);
        assert!(sparse.validate().is_ok());
    }

    #[test]
    fn test_occupied_records_sorted() {
        let mut snap = snapshot();
        snap.cells.reverse();
        snap.cells[0].template = Some("wall".into());

        let coords: Vec<GridCoord> = snap.occupied_records().iter().map(|r| r.coord()).collect();
        assert_eq!(coords, vec![GridCoord::new(1, 1), GridCoord::new(2, 1)]);
    }

    #[test]
    fn test_empty_template_name_is_not_occupied() {
        let mut record = CellRecord::empty(0, 0);
        record.template = Some(String::new());
        assert!(!record.is_occupied());
    }
}
