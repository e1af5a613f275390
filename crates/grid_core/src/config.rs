//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::math::{Fixed, Vec3Fixed};

/// Default grid width in cells.
pub const DEFAULT_WIDTH: u32 = 10;
/// Default grid height in cells.
pub const DEFAULT_HEIGHT: u32 = 10;
/// Default cell size in world units.
pub const DEFAULT_CELL_SIZE: u32 = 5;
/// Largest total cell count a grid may have.
pub const MAX_CELLS: u64 = 1 << 24;

/// Check a grid's dimensions: both positive, both within `i32`, and at most
/// [`MAX_CELLS`] cells in total.
///
/// # Errors
///
/// Returns [`GridError::InvalidConfig`] naming the offending size.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidConfig(format!(
            "grid size {width}x{height} must be positive"
        )));
    }
    if i32::try_from(width).is_err()
        || i32::try_from(height).is_err()
        || u64::from(width) * u64::from(height) > MAX_CELLS
    {
        return Err(GridError::InvalidConfig(format!(
            "grid size {width}x{height} is too large"
        )));
    }
    Ok(())
}

/// Size and placement of the building grid.
///
/// Whole world units keep the config file readable and the conversion to
/// fixed-point exact.
///
/// # Example RON
///
/// ```ron
/// GridConfig(
///     width: 20,
///     height: 12,
///     cell_size: 5,
///     origin: (0, 0, 0),
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell edge length in world units.
    pub cell_size: u32,
    /// World position of cell (0, 0)'s corner.
    pub origin: (i32, i32, i32),
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            origin: (0, 0, 0),
        }
    }
}

impl GridConfig {
    /// Check the config can build a grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] for zero or oversized dimensions
    /// or a zero cell size.
    pub fn validate(&self) -> Result<()> {
        check_dimensions(self.width, self.height)?;
        if self.cell_size == 0 || i32::try_from(self.cell_size).is_err() {
            return Err(GridError::InvalidConfig(format!(
                "cell size {} is out of range",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// Cell size as a fixed-point number.
    #[must_use]
    pub fn cell_size_fixed(&self) -> Fixed {
        Fixed::from_num(self.cell_size)
    }

    /// Origin as a world vector.
    #[must_use]
    pub fn origin_vec(&self) -> Vec3Fixed {
        let (x, y, z) = self.origin;
        Vec3Fixed::from_ints(x, y, z)
    }

    /// Parse from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DataParseError`] on malformed RON and
    /// [`GridError::InvalidConfig`] if the values are unusable.
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GridError::DataParseError {
            path: source.to_owned(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_size_fixed(), Fixed::from_num(5));
        assert_eq!(config.origin_vec(), Vec3Fixed::ZERO);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = GridConfig::from_ron_str("GridConfig(width: 32, origin: (4, 0, -8))", "inline")
            .unwrap();
        assert_eq!(config.width, 32);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.origin_vec(), Vec3Fixed::from_ints(4, 0, -8));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = GridConfig {
            width: 0,
            ..GridConfig::default()
        };
        assert!(matches!(config.validate(), Err(GridError::InvalidConfig(_))));

        let config = GridConfig {
            cell_size: 0,
            ..GridConfig::default()
        };
        assert!(matches!(config.validate(), Err(GridError::InvalidConfig(_))));

        assert!(matches!(
            GridConfig::from_ron_str("GridConfig(height: 0)", "inline"),
            Err(GridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_grids_rejected() {
        let config = GridConfig {
            width: 1 << 12,
            height: 1 << 12,
            ..GridConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = GridConfig {
            height: (1 << 12) + 1,
            ..config
        };
        assert!(matches!(config.validate(), Err(GridError::InvalidConfig(_))));
        assert!(check_dimensions(u32::MAX, 1).is_err());
        assert!(check_dimensions(i32::MAX as u32, i32::MAX as u32).is_err());
    }
}
