//! Policy domain
//!
//! CRUD access to policies stored in an append-only warehouse table with a
//! derived "current policy" view. Policies are never updated or deleted in
//! place: every mutation inserts a new version row with a fresh `rowId`, an
//! advancing `createdAt` timestamp, and an `isDeleted` tombstone flag. The
//! "current" state of a policy is whatever the downstream view selects as the
//! latest non-tombstoned row for its `policyId`.
//!
//! The crate owns:
//! - [`config::StoreConfig`] - relation names and field lists, supplied by
//!   trusted configuration
//! - [`ports`] - traits for the two external collaborators: the warehouse
//!   execution client and the metadata manager
//! - [`queries::PolicyQueries`] - parameterized SQL construction
//! - [`service::PolicyService`] - the five operations, each returning the
//!   uniform [`envelope::Envelope`]

pub mod config;
pub mod envelope;
pub mod error;
pub mod ports;
pub mod queries;
pub mod record;
pub mod service;

pub use config::StoreConfig;
pub use envelope::Envelope;
pub use error::OperationError;
pub use ports::{MetadataError, MetadataPort, Row, WarehouseError, WarehousePort};
pub use queries::{CurrentFilter, PolicyQueries, PAGE_LIMIT};
pub use service::PolicyService;
