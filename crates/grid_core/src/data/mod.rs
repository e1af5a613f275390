//! Data structures for footprint configuration.
//!
//! Pure data types deserialized from RON files, plus the registry that
//! validates them into [`FootprintTemplate`](crate::footprint::FootprintTemplate)s.
//!
//! **Note:** This module contains no IO - it only parses strings.
//! File loading is handled by the host (see `grid_tools`).

mod footprint_data;
mod registry;

pub use footprint_data::{FootprintData, FootprintSet};
pub use registry::TemplateRegistry;
