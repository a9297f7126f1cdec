//! Core Kernel - Foundational types for the policy ledger
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure layers:
//! - Strongly-typed identifiers for rows, policies, accounts, and warehouse
//!   namespaces
//! - Write timestamps used as the append-only version ordering key
//! - The parameterized statement type exchanged with the warehouse client

pub mod identifiers;
pub mod statement;
pub mod temporal;

pub use identifiers::{AccountId, DatasetId, PolicyId, ProjectId, RowId};
pub use statement::{Params, Statement};
pub use temporal::write_timestamp;
