//! Footprint data structures for data-driven building definitions.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::footprint::{CellOffset, FootprintTemplate};

/// Data-driven footprint definition.
///
/// # Example RON
///
/// ```ron
/// FootprintData(
///     name: "watchtower",
///     width: 1,
///     height: 1,
/// )
/// ```
///
/// Non-rectangular footprints list their covered cells explicitly:
///
/// ```ron
/// FootprintData(
///     name: "wall_corner",
///     width: 2,
///     height: 2,
///     offsets: Some([(0, 0), (0, 1), (1, 1)]),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintData {
    /// Unique name; saves refer to templates by this.
    pub name: String,

    /// Width in cells when facing down.
    pub width: u32,

    /// Height in cells when facing down.
    pub height: u32,

    /// Covered cells when facing down. Omitted means the full rectangle.
    #[serde(default)]
    pub offsets: Option<Vec<CellOffset>>,
}

impl FootprintData {
    /// Validate into a template.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTemplate`](crate::error::GridError::InvalidTemplate)
    /// for malformed data.
    pub fn into_template(self) -> Result<FootprintTemplate> {
        match self.offsets {
            Some(offsets) => {
                FootprintTemplate::with_offsets(self.name, self.width, self.height, offsets)
            }
            None => FootprintTemplate::rectangle(self.name, self.width, self.height),
        }
    }
}

impl From<&FootprintTemplate> for FootprintData {
    fn from(template: &FootprintTemplate) -> Self {
        Self {
            name: template.name().to_owned(),
            width: template.width(),
            height: template.height(),
            offsets: Some(template.offsets().to_vec()),
        }
    }
}

/// A file's worth of footprint definitions.
///
/// # Example RON
///
/// ```ron
/// FootprintSet(
///     templates: [
///         FootprintData(name: "house", width: 2, height: 2),
///         FootprintData(name: "barracks", width: 2, height: 3),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintSet {
    /// All definitions in the file.
    #[serde(default)]
    pub templates: Vec<FootprintData>,
}
