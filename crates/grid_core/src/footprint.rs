//! Building footprints and facing directions.
//!
//! A [`FootprintTemplate`] lists the cells a building covers when facing
//! [`Direction::Down`], as offsets inside its `width × height` box.
//! Rotating to another direction maps every offset with an exact integer
//! lookup so rotated cells always land on grid cells. A rotated footprint
//! keeps non-negative offsets, so the origin cell is always the
//! footprint's lowest `(x, z)` corner.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::grid::GridCoord;

/// Relative cell offset `(dx, dz)` inside a footprint.
pub type CellOffset = (i32, i32);

/// Facing direction of a placed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Unrotated.
    #[default]
    Down,
    /// One quarter turn.
    Left,
    /// Half turn.
    Up,
    /// Three quarter turns.
    Right,
}

impl Direction {
    /// All directions in rotation order.
    pub const ALL: [Self; 4] = [Self::Down, Self::Left, Self::Up, Self::Right];

    /// The next direction in the cycle Down → Left → Up → Right → Down.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            Self::Up => Self::Right,
            Self::Right => Self::Down,
        }
    }

    /// Number of quarter turns from [`Direction::Down`].
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Down => 0,
            Self::Left => 1,
            Self::Up => 2,
            Self::Right => 3,
        }
    }

    /// Yaw in degrees for rendering the building.
    #[must_use]
    pub const fn rotation_angle(self) -> u32 {
        match self {
            Self::Down => 0,
            Self::Left => 90,
            Self::Up => 180,
            Self::Right => 270,
        }
    }

    /// Shift, in cells, from the origin cell's corner to where the rotated
    /// model's pivot sits, for a template of the given base size.
    #[must_use]
    pub const fn rotation_offset(self, width: u32, height: u32) -> CellOffset {
        let (w, h) = (width as i32, height as i32);
        match self {
            Self::Down => (0, 0),
            Self::Left => (0, w),
            Self::Up => (w, h),
            Self::Right => (h, 0),
        }
    }

    /// Map a base offset into this direction's orientation.
    ///
    /// `width` and `height` are the unrotated box size.
    #[must_use]
    pub const fn rotate_offset(self, offset: CellOffset, width: u32, height: u32) -> CellOffset {
        let (dx, dz) = offset;
        let (w, h) = (width as i32, height as i32);
        match self {
            Self::Down => (dx, dz),
            Self::Left => (dz, w - 1 - dx),
            Self::Up => (w - 1 - dx, h - 1 - dz),
            Self::Right => (h - 1 - dz, dx),
        }
    }

    /// Box size `(width, height)` after rotating a `width × height` box.
    #[must_use]
    pub const fn rotated_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Down | Self::Up => (width, height),
            Self::Left | Self::Right => (height, width),
        }
    }
}

/// One quarter turn of an offset inside a `width × height` box.
///
/// The result lies in the rotated `height × width` box. Four applications,
/// with the box size swapped each time, return the original offset.
#[must_use]
pub const fn rotate_quarter(offset: CellOffset, width: u32) -> CellOffset {
    let (dx, dz) = offset;
    (dz, width as i32 - 1 - dx)
}

/// Which cells a placeable building covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintTemplate {
    /// Unique template name, used to look it up when loading saves.
    name: String,
    /// Box width in cells when facing down.
    width: u32,
    /// Box height in cells when facing down.
    height: u32,
    /// Covered cells when facing down, in declaration order.
    offsets: Vec<CellOffset>,
}

impl FootprintTemplate {
    /// A template covering its whole `width × height` box.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTemplate`] if either size is zero.
    pub fn rectangle(name: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let offsets = (0..width as i32)
            .flat_map(|dx| (0..height as i32).map(move |dz| (dx, dz)))
            .collect();
        Self::with_offsets(name, width, height, offsets)
    }

    /// A template covering exactly `offsets`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTemplate`] if the name is empty, a size is
    /// zero, the offset list is empty, or an offset is duplicated or lies
    /// outside the `width × height` box.
    pub fn with_offsets(
        name: impl Into<String>,
        width: u32,
        height: u32,
        offsets: Vec<CellOffset>,
    ) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| GridError::InvalidTemplate {
            name: name.clone(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if width == 0 || height == 0 {
            return Err(invalid(format!("size {width}x{height} must be positive")));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(invalid(format!("size {width}x{height} is too large")));
        }
        if offsets.is_empty() {
            return Err(invalid("offset list is empty".into()));
        }
        for (i, &(dx, dz)) in offsets.iter().enumerate() {
            if dx < 0 || dz < 0 || dx >= width as i32 || dz >= height as i32 {
                return Err(invalid(format!(
                    "offset ({dx}, {dz}) lies outside the {width}x{height} box"
                )));
            }
            if offsets[..i].contains(&(dx, dz)) {
                return Err(invalid(format!("offset ({dx}, {dz}) is listed twice")));
            }
        }

        Ok(Self {
            name,
            width,
            height,
            offsets,
        })
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Box width in cells when facing down.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Box height in cells when facing down.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Unrotated offsets.
    #[must_use]
    pub fn offsets(&self) -> &[CellOffset] {
        &self.offsets
    }

    /// Offsets for a facing direction, in declaration order.
    #[must_use]
    pub fn rotated_offsets(&self, direction: Direction) -> Vec<CellOffset> {
        self.offsets
            .iter()
            .map(|&offset| direction.rotate_offset(offset, self.width, self.height))
            .collect()
    }

    /// Anchor shift for a facing direction, see [`Direction::rotation_offset`].
    #[must_use]
    pub const fn rotation_offset(&self, direction: Direction) -> CellOffset {
        direction.rotation_offset(self.width, self.height)
    }

    /// Lowest `(x, z)` covered offset for a facing direction.
    ///
    /// `(0, 0)` for rectangles. Saved grids only know covered cells, so
    /// reloading subtracts this from a footprint's lowest cell to recover
    /// its origin.
    #[must_use]
    pub fn anchor_offset(&self, direction: Direction) -> CellOffset {
        self.rotated_offsets(direction)
            .into_iter()
            .min()
            .unwrap_or((0, 0))
    }

    /// Absolute cells covered when anchored at `origin` facing `direction`.
    ///
    /// Cells past the `i32` range saturate at its ends, which no grid
    /// contains, so such footprints always check as out of bounds.
    #[must_use]
    pub fn cells_at(&self, origin: GridCoord, direction: Direction) -> Vec<GridCoord> {
        self.offsets
            .iter()
            .map(|&offset| {
                let (dx, dz) = direction.rotate_offset(offset, self.width, self.height);
                origin.offset(dx, dz)
            })
            .collect()
    }
}
