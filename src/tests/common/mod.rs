//! Common Test Utilities
//!
//! Shared fixtures for building trackers on a controllable clock,
//! rosters and turn histories.

pub mod fixtures;

pub use fixtures::*;
