//! Warehouse infrastructure layer
//!
//! sqlx/Postgres adapters for the two domain ports: a warehouse client that
//! executes the domain's named-placeholder statements, and a metadata manager
//! that invokes a configured refresh routine. The domain never sees sqlx;
//! everything crosses the port traits as JSON.

pub mod client;
pub mod metadata;
pub mod pool;

pub use client::PgWarehouse;
pub use metadata::SqlMetadataManager;
pub use pool::{create_pool, PoolSettings, WarehousePool};
