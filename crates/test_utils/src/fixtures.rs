//! Pre-built test fixtures
//!
//! Consistent, predictable data for store configuration and policy payloads.

use core_kernel::{PolicyId, ProjectId};
use domain_policy::config::fields;
use domain_policy::ports::Row;
use domain_policy::StoreConfig;
use serde_json::json;

/// Fixtures for store configuration.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// The default store layout used across the suite.
    pub fn store() -> StoreConfig {
        StoreConfig::default()
    }

    /// The project every test writes into.
    pub fn project() -> ProjectId {
        ProjectId::new("analytics-test")
    }
}

/// Fixtures for policy payloads and view rows.
pub struct PolicyFixtures;

impl PolicyFixtures {
    /// Caller-supplied business data for a create request.
    pub fn request_data() -> Row {
        let mut data = Row::new();
        data.insert("name".to_string(), json!("p1"));
        data.insert("description".to_string(), json!("test policy"));
        data.insert(
            fields::DATASETS.to_string(),
            json!([{ fields::DATASET_ID: "ds-1" }]),
        );
        data
    }

    /// A row shaped like the current-policy view would return it.
    pub fn current_row(policy_id: &PolicyId) -> Row {
        let mut row = Row::new();
        row.insert(
            fields::POLICY_ID.to_string(),
            json!(policy_id.as_uuid().to_string()),
        );
        row.insert(fields::IS_DELETED.to_string(), json!(false));
        row.insert(
            fields::CREATED_AT.to_string(),
            json!("2026-01-15T09:30:00.000000Z"),
        );
        row.insert("name".to_string(), json!("p1"));
        row.insert("description".to_string(), json!("test policy"));
        row.insert(
            fields::DATASETS.to_string(),
            json!([{ fields::DATASET_ID: "ds-1" }]),
        );
        row.insert("tags".to_string(), json!(["governance"]));
        row
    }
}
