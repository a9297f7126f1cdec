//! Query builder tests
//!
//! Pin the SQL text and bindings of the insert and of every current-view
//! filter mode. Values must never appear in the SQL text; only configured
//! identifiers do.

use core_kernel::{AccountId, DatasetId, PolicyId};
use domain_policy::record::{version_row, VersionStamp};
use domain_policy::{CurrentFilter, PolicyQueries, PAGE_LIMIT};
use serde_json::{json, Value};
use test_utils::{ConfigFixtures, PolicyFixtures};

#[test]
fn insert_uses_configured_write_schema() {
    let config = ConfigFixtures::store();
    let project = ConfigFixtures::project();
    let queries = PolicyQueries::new(&config, &project);

    let stamp = VersionStamp::create();
    let row = version_row(PolicyFixtures::request_data(), &stamp);
    let statement = queries.insert(&row);

    assert_eq!(
        statement.sql,
        "INSERT INTO `analytics-test.governance.policies` \
         (rowId, policyId, isDeleted, createdAt, name, description, datasets, tags) \
         VALUES (@rowId, @policyId, @isDeleted, @createdAt, @name, @description, @datasets, @tags)"
    );
    assert_eq!(statement.params["name"], json!("p1"));
    assert_eq!(statement.params["isDeleted"], json!(false));
    assert_eq!(
        statement.params["policyId"],
        json!(stamp.policy_id.as_uuid().to_string())
    );
    // Field configured but absent from the payload binds as null
    assert_eq!(statement.params["tags"], Value::Null);
}

#[test]
fn unscoped_select_is_page_limited() {
    let config = ConfigFixtures::store();
    let project = ConfigFixtures::project();
    let statement =
        PolicyQueries::new(&config, &project).select_current(&CurrentFilter::All);

    assert_eq!(
        statement.sql,
        format!(
            "SELECT policyId, isDeleted, createdAt, name, description, datasets, tags \
             FROM `analytics-test.governance.policies_current` LIMIT {PAGE_LIMIT}"
        )
    );
    assert!(statement.params.is_empty());
}

#[test]
fn dataset_filter_unnests_the_datasets_array() {
    let config = ConfigFixtures::store();
    let project = ConfigFixtures::project();
    let statement = PolicyQueries::new(&config, &project)
        .select_current(&CurrentFilter::Dataset(DatasetId::new("ds-1")));

    assert!(statement.sql.contains("UNNEST(p.datasets) AS dataset"));
    assert!(statement.sql.contains("dataset.datasetId = @datasetId"));
    assert!(statement.sql.ends_with(&format!("LIMIT {PAGE_LIMIT}")));
    // The dataset id travels as a binding, never in the SQL text
    assert!(!statement.sql.contains("ds-1"));
    assert_eq!(statement.params["datasetId"], json!("ds-1"));
}

#[test]
fn account_filter_joins_links_and_drops_tombstone_from_projection() {
    let config = ConfigFixtures::store();
    let project = ConfigFixtures::project();
    let account_id = AccountId::new();
    let statement = PolicyQueries::new(&config, &project)
        .select_current(&CurrentFilter::Account(account_id));

    assert!(statement
        .sql
        .starts_with("SELECT p.policyId, p.createdAt, p.name"));
    assert!(!statement.sql.contains("p.isDeleted,"));
    assert!(statement
        .sql
        .contains("`analytics-test.governance.accounts_current` AS account"));
    assert!(statement.sql.contains("UNNEST(account.policies)"));
    assert!(statement.sql.contains("account.accountId = @accountId"));
    assert!(statement.sql.contains("account.isDeleted = false"));
    assert!(statement
        .sql
        .contains("LEFT JOIN `analytics-test.governance.policies_current` AS p"));
    assert!(statement.sql.ends_with("WHERE p.isDeleted = false"));
    assert_eq!(
        statement.params["accountId"],
        json!(account_id.as_uuid().to_string())
    );
}

#[test]
fn point_lookup_is_limited_to_one_row() {
    let config = ConfigFixtures::store();
    let project = ConfigFixtures::project();
    let policy_id = PolicyId::new();
    let statement = PolicyQueries::new(&config, &project)
        .select_current(&CurrentFilter::Policy(policy_id));

    assert!(statement.sql.contains("WHERE policyId = @policyId"));
    assert!(statement.sql.ends_with("LIMIT 1"));
    assert_eq!(
        statement.params["policyId"],
        json!(policy_id.as_uuid().to_string())
    );
}
