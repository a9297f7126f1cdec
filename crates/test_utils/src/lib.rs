//! Shared test utilities
//!
//! Recording mocks for the two domain ports plus fixtures for store
//! configuration and policy payloads. Everything here runs in-process; no
//! database or network is involved.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{ConfigFixtures, PolicyFixtures};
pub use mocks::{MockMetadata, MockWarehouse};
