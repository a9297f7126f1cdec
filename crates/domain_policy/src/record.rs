//! Version-row construction
//!
//! Every mutation becomes one new row in the append-only table: caller data
//! merged with the generated system fields. Generated fields win over
//! same-named caller fields, so callers can never forge `rowId`, `policyId`,
//! `isDeleted`, or `createdAt`.

use core_kernel::{write_timestamp, Params, PolicyId, RowId};
use serde_json::{json, Value};

use crate::config::fields;
use crate::ports::Row;

/// The generated system fields of one version row.
#[derive(Debug, Clone)]
pub struct VersionStamp {
    pub row_id: RowId,
    pub policy_id: PolicyId,
    pub deleted: bool,
    pub created_at: String,
}

impl VersionStamp {
    /// Stamp for a brand-new policy: fresh `policyId`, not deleted.
    pub fn create() -> Self {
        Self::for_policy(PolicyId::new(), false)
    }

    /// Stamp for a new version of an existing policy.
    pub fn for_policy(policy_id: PolicyId, deleted: bool) -> Self {
        Self {
            row_id: RowId::new(),
            policy_id,
            deleted,
            created_at: write_timestamp(),
        }
    }
}

/// Merges the stamp onto caller data, producing the full version row.
pub fn version_row(data: Row, stamp: &VersionStamp) -> Row {
    let mut row = data;
    row.insert(
        fields::ROW_ID.to_string(),
        json!(stamp.row_id.as_uuid().to_string()),
    );
    row.insert(
        fields::POLICY_ID.to_string(),
        json!(stamp.policy_id.as_uuid().to_string()),
    );
    row.insert(fields::IS_DELETED.to_string(), json!(stamp.deleted));
    row.insert(fields::CREATED_AT.to_string(), json!(stamp.created_at));
    row
}

/// Projects a row onto the configured write schema. Fields the row does not
/// carry are bound as nulls; fields outside the schema are dropped.
pub fn insert_params(table_fields: &[String], row: &Row) -> Params {
    table_fields
        .iter()
        .map(|field| {
            let value = row.get(field).cloned().unwrap_or(Value::Null);
            (field.clone(), value)
        })
        .collect()
}
