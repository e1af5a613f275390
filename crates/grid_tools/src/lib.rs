//! # Grid Development Tools
//!
//! Command-line tools for development:
//! - Footprint template validators
//! - Scenario path queries
//! - ASCII grid rendering

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod scenario;
pub mod validate;
