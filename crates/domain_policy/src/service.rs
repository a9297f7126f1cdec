//! Policy service
//!
//! Orchestrates the warehouse client and the metadata manager to implement
//! the five operations. Every mutation is one new row in the append-only
//! table followed by a best-effort metadata refresh; reads go straight to the
//! current-policy view. All failures are converted into the envelope at the
//! operation boundary, nothing is rethrown.
//!
//! Concurrent writers of the same `policyId` are not coordinated here; which
//! of two near-simultaneous version rows the view presents as current is the
//! view's decision.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use core_kernel::{AccountId, DatasetId, PolicyId, ProjectId};

use crate::config::StoreConfig;
use crate::envelope::Envelope;
use crate::error::OperationError;
use crate::ports::{MetadataPort, Row, WarehousePort};
use crate::queries::{CurrentFilter, PolicyQueries};
use crate::record::{version_row, VersionStamp};

pub struct PolicyService {
    config: StoreConfig,
    warehouse: Arc<dyn WarehousePort>,
    metadata: Arc<dyn MetadataPort>,
}

impl PolicyService {
    pub fn new(
        config: StoreConfig,
        warehouse: Arc<dyn WarehousePort>,
        metadata: Arc<dyn MetadataPort>,
    ) -> Self {
        Self {
            config,
            warehouse,
            metadata,
        }
    }

    /// Lists current policies, optionally scoped to a dataset or an account.
    /// At most one scope is honored; `dataset_id` wins when both are given.
    pub async fn list_policies(
        &self,
        project: &ProjectId,
        dataset_id: Option<DatasetId>,
        account_id: Option<AccountId>,
    ) -> Envelope {
        let filter = match (dataset_id, account_id) {
            (Some(dataset), _) => CurrentFilter::Dataset(dataset),
            (None, Some(account)) => CurrentFilter::Account(account),
            (None, None) => CurrentFilter::All,
        };
        self.try_list(project, &filter)
            .await
            .map_or_else(Envelope::from, Envelope::ok)
    }

    /// Creates a policy: fresh `policyId`, `isDeleted=false`, one insert,
    /// then a metadata refresh. A failed refresh triggers a fire-and-forget
    /// compensating tombstone and fails the request.
    pub async fn create_policy(&self, project: &ProjectId, data: Row) -> Envelope {
        self.try_create(project, data)
            .await
            .map_or_else(Envelope::from, Envelope::ok)
    }

    /// Inserts a new version row for an existing policy.
    pub async fn update_policy(
        &self,
        project: &ProjectId,
        policy_id: PolicyId,
        data: Row,
    ) -> Envelope {
        self.try_write_version(project, policy_id, data)
            .await
            .map_or_else(Envelope::from, Envelope::ok)
    }

    /// Inserts a tombstone row for the policy.
    pub async fn delete_policy(
        &self,
        project: &ProjectId,
        policy_id: PolicyId,
        data: Row,
    ) -> Envelope {
        self.try_write_version(project, policy_id, data)
            .await
            .map_or_else(Envelope::from, |_| Envelope::ok(json!({})))
    }

    /// Point lookup against the current-policy view.
    pub async fn get_policy(&self, project: &ProjectId, policy_id: PolicyId) -> Envelope {
        self.try_get(project, policy_id)
            .await
            .map_or_else(Envelope::from, Envelope::ok)
    }

    async fn try_list(
        &self,
        project: &ProjectId,
        filter: &CurrentFilter,
    ) -> Result<Value, OperationError> {
        let queries = PolicyQueries::new(&self.config, project);
        let rows = self
            .warehouse
            .execute(&queries.select_current(filter))
            .await?;
        if rows.is_empty() {
            return Err(OperationError::NotFound {
                relation: self.config.view_fqdn(project),
            });
        }
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }

    async fn try_create(
        &self,
        project: &ProjectId,
        data: Row,
    ) -> Result<Value, OperationError> {
        let stamp = VersionStamp::create();
        let policy_id = stamp.policy_id;
        let row = version_row(data, &stamp);

        self.insert_version(project, &row).await?;
        info!(project = %project, policy_id = %policy_id, "inserted policy version row");

        if let Err(refresh) = self.metadata.refresh_policies(project, &[policy_id]).await {
            warn!(
                project = %project,
                policy_id = %policy_id,
                error = %refresh,
                "metadata refresh failed after create, writing compensating tombstone"
            );
            self.spawn_compensating_tombstone(project, policy_id);
            return Err(OperationError::MetadataRefresh(refresh.to_string()));
        }

        // The locally constructed record, not re-fetched from storage.
        Ok(Value::Object(row))
    }

    // Update and delete share the insert-then-refresh shape; both write a
    // version row carrying the tombstone flag, and how such rows surface is
    // the downstream view's call. Neither compensates on a failed refresh.
    async fn try_write_version(
        &self,
        project: &ProjectId,
        policy_id: PolicyId,
        data: Row,
    ) -> Result<Value, OperationError> {
        let stamp = VersionStamp::for_policy(policy_id, true);
        let row = version_row(data, &stamp);

        self.insert_version(project, &row).await?;
        info!(project = %project, policy_id = %policy_id, "inserted policy version row");

        self.metadata
            .refresh_policies(project, &[policy_id])
            .await
            .map_err(|refresh| OperationError::MetadataRefresh(refresh.to_string()))?;

        Ok(Value::Object(row))
    }

    async fn try_get(
        &self,
        project: &ProjectId,
        policy_id: PolicyId,
    ) -> Result<Value, OperationError> {
        let queries = PolicyQueries::new(&self.config, project);
        let rows = self
            .warehouse
            .execute(&queries.select_current(&CurrentFilter::Policy(policy_id)))
            .await?;
        // The view guarantees at most one current row per policy; trust it
        // and take the first.
        rows.into_iter()
            .next()
            .map(Value::Object)
            .ok_or_else(|| OperationError::NotFound {
                relation: self.config.view_fqdn(project),
            })
    }

    async fn insert_version(
        &self,
        project: &ProjectId,
        row: &Row,
    ) -> Result<(), OperationError> {
        let queries = PolicyQueries::new(&self.config, project);
        let returned = self.warehouse.execute(&queries.insert(row)).await?;
        if !returned.is_empty() {
            return Err(OperationError::WriteAnomaly {
                relation: self.config.table_fqdn(project),
                data: Value::Object(row.clone()),
            });
        }
        Ok(())
    }

    /// Detached best-effort tombstone for a policy whose create could not be
    /// completed. The outcome is only logged; the request that triggered it
    /// has already failed.
    fn spawn_compensating_tombstone(&self, project: &ProjectId, policy_id: PolicyId) {
        let stamp = VersionStamp::for_policy(policy_id, true);
        let row = version_row(Row::new(), &stamp);
        let statement = PolicyQueries::new(&self.config, project).insert(&row);
        let warehouse = Arc::clone(&self.warehouse);
        let project = project.clone();

        tokio::spawn(async move {
            match warehouse.execute(&statement).await {
                Ok(returned) if returned.is_empty() => {
                    info!(project = %project, policy_id = %policy_id, "compensating tombstone written");
                }
                Ok(_) => {
                    error!(
                        project = %project,
                        policy_id = %policy_id,
                        "compensating tombstone insert reported unexpected rows"
                    );
                }
                Err(err) => {
                    error!(
                        project = %project,
                        policy_id = %policy_id,
                        error = %err,
                        "compensating tombstone insert failed"
                    );
                }
            }
        });
    }
}
