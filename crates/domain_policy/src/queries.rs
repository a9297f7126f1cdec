//! Parameterized SQL construction for the policy relations
//!
//! SQL text is assembled from trusted configuration identifiers only; every
//! value goes through the `@name` bindings map of the produced
//! [`Statement`]. The insert targets the append-only table, the selects
//! target the derived current-policy view.

use core_kernel::{AccountId, DatasetId, Params, PolicyId, ProjectId, Statement};
use serde_json::json;

use crate::config::{fields, StoreConfig};
use crate::ports::Row;
use crate::record::insert_params;

/// Fixed page limit of the unscoped and dataset-scoped lists.
pub const PAGE_LIMIT: usize = 10;

/// Filter modes of the current-view select.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentFilter {
    /// Up to [`PAGE_LIMIT`] rows, unordered beyond what the view provides.
    All,
    /// Policies whose `datasets` array contains an entry for this dataset.
    Dataset(DatasetId),
    /// Policies linked to a non-deleted account.
    Account(AccountId),
    /// Single-policy point lookup.
    Policy(PolicyId),
}

/// Builds the insert and select statements for one project's policy store.
#[derive(Debug, Clone, Copy)]
pub struct PolicyQueries<'a> {
    config: &'a StoreConfig,
    project: &'a ProjectId,
}

impl<'a> PolicyQueries<'a> {
    pub fn new(config: &'a StoreConfig, project: &'a ProjectId) -> Self {
        Self { config, project }
    }

    /// Single version-row insert into the append-only table. Column list and
    /// placeholders follow the configured write schema; bindings are taken
    /// from the row, absent fields bound as nulls.
    pub fn insert(&self, row: &Row) -> Statement {
        let columns = self.config.table_fields.join(", ");
        let placeholders = self
            .config
            .table_fields
            .iter()
            .map(|field| format!("@{field}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.config.table_fqdn(self.project),
            columns,
            placeholders,
        );
        Statement::new(sql, insert_params(&self.config.table_fields, row))
    }

    /// Select against the current-policy view in one of the four filter
    /// modes.
    pub fn select_current(&self, filter: &CurrentFilter) -> Statement {
        let view = self.config.view_fqdn(self.project);

        match filter {
            CurrentFilter::All => Statement::bare(format!(
                "SELECT {} FROM {} LIMIT {}",
                self.projection(None, false),
                view,
                PAGE_LIMIT,
            )),

            CurrentFilter::Dataset(dataset_id) => {
                let sql = format!(
                    "SELECT {} FROM {} AS p, UNNEST(p.{}) AS dataset \
                     WHERE dataset.{} = @{} LIMIT {}",
                    self.projection(Some("p"), false),
                    view,
                    fields::DATASETS,
                    fields::DATASET_ID,
                    fields::DATASET_ID,
                    PAGE_LIMIT,
                );
                let mut params = Params::new();
                params.insert(fields::DATASET_ID.to_string(), json!(dataset_id.as_str()));
                Statement::new(sql, params)
            }

            CurrentFilter::Account(account_id) => {
                // Policy ids of the non-deleted account, left-joined back to
                // the current view; rows are pre-filtered to non-deleted, so
                // the tombstone flag is dropped from the projection.
                let sql = format!(
                    "SELECT {} FROM (\
                     SELECT linkedPolicyId FROM {} AS account, \
                     UNNEST(account.policies) AS linkedPolicyId \
                     WHERE account.{} = @{} AND account.{} = false\
                     ) AS links \
                     LEFT JOIN {} AS p ON links.linkedPolicyId = p.{} \
                     WHERE p.{} = false",
                    self.projection(Some("p"), true),
                    self.config.account_fqdn(self.project),
                    fields::ACCOUNT_ID,
                    fields::ACCOUNT_ID,
                    fields::IS_DELETED,
                    view,
                    fields::POLICY_ID,
                    fields::IS_DELETED,
                );
                let mut params = Params::new();
                params.insert(
                    fields::ACCOUNT_ID.to_string(),
                    json!(account_id.as_uuid().to_string()),
                );
                Statement::new(sql, params)
            }

            CurrentFilter::Policy(policy_id) => {
                let sql = format!(
                    "SELECT {} FROM {} WHERE {} = @{} LIMIT 1",
                    self.projection(None, false),
                    view,
                    fields::POLICY_ID,
                    fields::POLICY_ID,
                );
                let mut params = Params::new();
                params.insert(
                    fields::POLICY_ID.to_string(),
                    json!(policy_id.as_uuid().to_string()),
                );
                Statement::new(sql, params)
            }
        }
    }

    fn projection(&self, prefix: Option<&str>, drop_tombstone: bool) -> String {
        self.config
            .view_fields
            .iter()
            .filter(|field| !(drop_tombstone && *field == fields::IS_DELETED))
            .map(|field| match prefix {
                Some(p) => format!("{p}.{field}"),
                None => field.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
