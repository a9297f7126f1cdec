//! Policy store configuration
//!
//! Relation names and field lists come from trusted configuration, never from
//! caller input. They are the only identifiers interpolated into SQL text;
//! all values travel through the statement bindings map.

use core_kernel::ProjectId;
use serde::Deserialize;
use thiserror::Error;

/// Field names every write schema must carry.
pub mod fields {
    /// Opaque per-write identifier, never reused.
    pub const ROW_ID: &str = "rowId";
    /// Stable identifier of the logical policy.
    pub const POLICY_ID: &str = "policyId";
    /// Tombstone flag.
    pub const IS_DELETED: &str = "isDeleted";
    /// Version ordering key.
    pub const CREATED_AT: &str = "createdAt";
    /// Array-valued column of dataset associations on the current view.
    pub const DATASETS: &str = "datasets";
    /// Dataset key inside each `datasets` array element.
    pub const DATASET_ID: &str = "datasetId";
    /// Key of the account-link relation.
    pub const ACCOUNT_ID: &str = "accountId";
}

/// Errors raised by [`StoreConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing relation name: {0}")]
    MissingRelation(&'static str),

    #[error("Field list {list} is missing required field '{field}'")]
    MissingField { list: &'static str, field: &'static str },
}

/// Names and schemas of the policy relations inside one warehouse dataset.
///
/// `table_fields` is the ordered write schema of the append-only table;
/// `view_fields` is the read projection of the derived current-policy view.
/// Both are consumed as opaque, trusted identifier lists.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Dataset holding all policy relations.
    pub dataset_id: String,
    /// Append-only policy table.
    pub policy_table: String,
    /// Derived current-policy view.
    pub policy_view: String,
    /// Account-link view, read-only here.
    pub account_view: String,
    /// Ordered write schema of the policy table.
    pub table_fields: Vec<String>,
    /// Read projection of the current-policy view.
    pub view_fields: Vec<String>,
}

impl StoreConfig {
    /// Checks that relation names are present and the field lists carry the
    /// system fields the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("dataset_id", &self.dataset_id),
            ("policy_table", &self.policy_table),
            ("policy_view", &self.policy_view),
            ("account_view", &self.account_view),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingRelation(name));
            }
        }

        for field in [
            fields::ROW_ID,
            fields::POLICY_ID,
            fields::IS_DELETED,
            fields::CREATED_AT,
        ] {
            if !self.table_fields.iter().any(|f| f == field) {
                return Err(ConfigError::MissingField {
                    list: "table_fields",
                    field,
                });
            }
        }

        // The account-scoped list needs these to filter and to strip the
        // tombstone flag from its projection.
        for field in [fields::POLICY_ID, fields::IS_DELETED] {
            if !self.view_fields.iter().any(|f| f == field) {
                return Err(ConfigError::MissingField {
                    list: "view_fields",
                    field,
                });
            }
        }

        Ok(())
    }

    /// Backtick-quoted dotted FQDN of the append-only table.
    pub fn table_fqdn(&self, project: &ProjectId) -> String {
        self.relation(project, &self.policy_table)
    }

    /// Backtick-quoted dotted FQDN of the current-policy view.
    pub fn view_fqdn(&self, project: &ProjectId) -> String {
        self.relation(project, &self.policy_view)
    }

    /// Backtick-quoted dotted FQDN of the account-link view.
    pub fn account_fqdn(&self, project: &ProjectId) -> String {
        self.relation(project, &self.account_view)
    }

    fn relation(&self, project: &ProjectId, name: &str) -> String {
        format!("`{}.{}.{}`", project, self.dataset_id, name)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dataset_id: "governance".to_string(),
            policy_table: "policies".to_string(),
            policy_view: "policies_current".to_string(),
            account_view: "accounts_current".to_string(),
            table_fields: [
                fields::ROW_ID,
                fields::POLICY_ID,
                fields::IS_DELETED,
                fields::CREATED_AT,
                "name",
                "description",
                fields::DATASETS,
                "tags",
            ]
            .map(str::to_string)
            .to_vec(),
            view_fields: [
                fields::POLICY_ID,
                fields::IS_DELETED,
                fields::CREATED_AT,
                "name",
                "description",
                fields::DATASETS,
                "tags",
            ]
            .map(str::to_string)
            .to_vec(),
        }
    }
}
