//! SQL-routine-backed metadata manager
//!
//! The metadata manager is an external collaborator; this adapter models it
//! as a warehouse-side routine invoked with the project and the affected
//! policy ids. Whatever the routine does internally is not this layer's
//! concern; only success or failure crosses the port.

use async_trait::async_trait;
use tracing::debug;

use core_kernel::{PolicyId, ProjectId};
use domain_policy::ports::{MetadataError, MetadataPort};

use crate::pool::WarehousePool;

/// [`MetadataPort`] adapter invoking a configured refresh routine.
#[derive(Debug, Clone)]
pub struct SqlMetadataManager {
    pool: WarehousePool,
    /// Routine name, from trusted configuration.
    routine: String,
}

impl SqlMetadataManager {
    pub fn new(pool: WarehousePool, routine: impl Into<String>) -> Self {
        Self {
            pool,
            routine: routine.into(),
        }
    }
}

#[async_trait]
impl MetadataPort for SqlMetadataManager {
    async fn refresh_policies(
        &self,
        project: &ProjectId,
        policy_ids: &[PolicyId],
    ) -> Result<(), MetadataError> {
        let ids: Vec<String> = policy_ids
            .iter()
            .map(|id| id.as_uuid().to_string())
            .collect();

        let sql = format!("SELECT {}($1, $2)", self.routine);
        sqlx::query(&sql)
            .bind(project.as_str())
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(|e| MetadataError::new(e.to_string()))?;

        debug!(project = %project, policies = ids.len(), "metadata refresh completed");
        Ok(())
    }
}
