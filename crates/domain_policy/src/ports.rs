//! Ports for the two external collaborators
//!
//! The domain owns the traits; adapters live in the infrastructure layer.
//! Both collaborators sit behind the network and may fail independently of
//! each other, which is what the service's error taxonomy is built around.

use async_trait::async_trait;
use core_kernel::{PolicyId, ProjectId, Statement};
use thiserror::Error;

/// A result row as returned by the warehouse client.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Errors surfaced by warehouse execution.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Failed to reach the warehouse at all.
    #[error("Failed to connect to warehouse: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A result row could not be decoded.
    #[error("Row decode failed: {0}")]
    DecodeFailed(String),
}

impl WarehouseError {
    pub fn query(message: impl Into<String>) -> Self {
        WarehouseError::QueryFailed(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        WarehouseError::DecodeFailed(message.into())
    }
}

/// Failure of the downstream metadata refresh.
#[derive(Debug, Error)]
#[error("Metadata refresh failed: {message}")]
pub struct MetadataError {
    pub message: String,
}

impl MetadataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes parameterized SQL against the analytical warehouse.
///
/// The backing client signals a successful write by returning an empty result
/// set: an INSERT that comes back with rows is treated as a write anomaly by
/// the service. SELECTs return their result rows as JSON maps.
#[async_trait]
pub trait WarehousePort: Send + Sync {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError>;
}

/// Best-effort refresh of derived policy metadata after a write.
///
/// The service only consumes success or failure; whatever the manager does
/// internally is its own business. No retries happen at this layer.
#[async_trait]
pub trait MetadataPort: Send + Sync {
    async fn refresh_policies(
        &self,
        project: &ProjectId,
        policy_ids: &[PolicyId],
    ) -> Result<(), MetadataError>;
}
