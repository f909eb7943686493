//! Crate-level test suites.
//!
//! - `common`: shared fixtures
//! - `unit`: end-to-end scenarios through the public tracker API
//! - `property`: proptest invariants

mod common;
mod unit;
