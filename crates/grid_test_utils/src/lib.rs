//! # Grid Test Utilities
//!
//! Shared testing utilities for the grid crates:
//! - Fixture grids, templates and building systems
//! - Determinism harness for searches and snapshots
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
