//! Policy service tests
//!
//! Driven entirely by the recording port mocks: every scenario asserts the
//! envelope, the statements the warehouse received, and the refresh calls the
//! metadata manager received.

use std::sync::Arc;

use core_kernel::{AccountId, DatasetId, PolicyId};
use domain_policy::ports::{Row, WarehouseError};
use domain_policy::PolicyService;
use serde_json::{json, Value};
use test_utils::{ConfigFixtures, MockMetadata, MockWarehouse, PolicyFixtures};

fn build_service(
    warehouse: &Arc<MockWarehouse>,
    metadata: &Arc<MockMetadata>,
) -> PolicyService {
    PolicyService::new(
        ConfigFixtures::store(),
        Arc::clone(warehouse) as Arc<dyn domain_policy::WarehousePort>,
        Arc::clone(metadata) as Arc<dyn domain_policy::MetadataPort>,
    )
}

/// Lets detached tasks spawned by the service run to completion.
async fn drain_background_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn create_policy_inserts_stamped_row_and_refreshes_metadata() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);
    let project = ConfigFixtures::project();

    let envelope = service
        .create_policy(&project, PolicyFixtures::request_data())
        .await;

    assert!(envelope.is_success());
    let data = envelope.data.unwrap();
    assert_eq!(data["name"], json!("p1"));
    assert_eq!(data["isDeleted"], json!(false));
    let policy_id: PolicyId = data["policyId"].as_str().unwrap().parse().unwrap();
    let _row_id_is_a_uuid: uuid::Uuid = data["rowId"].as_str().unwrap().parse().unwrap();
    assert!(data["createdAt"].as_str().unwrap().ends_with('Z'));

    let statements = warehouse.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0]
        .sql
        .starts_with("INSERT INTO `analytics-test.governance.policies`"));
    assert_eq!(statements[0].params["name"], json!("p1"));
    assert_eq!(statements[0].params["isDeleted"], json!(false));

    assert_eq!(metadata.calls(), vec![(project, vec![policy_id])]);
}

#[tokio::test]
async fn create_policy_generates_unique_identifiers() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);
    let project = ConfigFixtures::project();

    let first = service
        .create_policy(&project, PolicyFixtures::request_data())
        .await;
    let second = service
        .create_policy(&project, PolicyFixtures::request_data())
        .await;

    let first_id = first.data.unwrap()["policyId"].as_str().unwrap().to_string();
    let second_id = second.data.unwrap()["policyId"].as_str().unwrap().to_string();
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn create_policy_refresh_failure_compensates_with_tombstone() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    metadata.fail_with("refresh exploded");
    let service = build_service(&warehouse, &metadata);
    let project = ConfigFixtures::project();

    let envelope = service
        .create_policy(&project, PolicyFixtures::request_data())
        .await;

    assert!(!envelope.is_success());
    assert_eq!(envelope.code, Some(500));
    assert!(envelope.errors[0].contains("refresh exploded"));

    drain_background_tasks().await;

    let statements = warehouse.statements();
    assert_eq!(statements.len(), 2);
    // Same policy, fresh row, tombstone flag set
    assert_eq!(
        statements[1].params["policyId"],
        statements[0].params["policyId"]
    );
    assert_ne!(statements[1].params["rowId"], statements[0].params["rowId"]);
    assert_eq!(statements[1].params["isDeleted"], json!(true));
}

#[tokio::test]
async fn create_policy_write_anomaly_is_500() {
    let warehouse = Arc::new(MockWarehouse::new());
    // The client signals write success with zero rows; any returned row is an
    // anomaly.
    warehouse.enqueue_rows(vec![PolicyFixtures::current_row(&PolicyId::new())]);
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .create_policy(&ConfigFixtures::project(), PolicyFixtures::request_data())
        .await;

    assert_eq!(envelope.code, Some(500));
    assert!(envelope.errors[0].contains("policies"));
    assert!(envelope.errors[0].contains("\"name\":\"p1\""));
    // The failed write never reaches the metadata manager
    assert!(metadata.calls().is_empty());
}

#[tokio::test]
async fn create_policy_storage_failure_is_500() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.enqueue_error(WarehouseError::query("backend unavailable"));
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .create_policy(&ConfigFixtures::project(), PolicyFixtures::request_data())
        .await;

    assert_eq!(envelope.code, Some(500));
    assert!(envelope.errors[0].contains("backend unavailable"));
}

#[tokio::test]
async fn update_policy_inserts_tombstoned_version_row() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);
    let project = ConfigFixtures::project();
    let policy_id = PolicyId::new();

    let mut data = Row::new();
    data.insert("name".to_string(), json!("p1-renamed"));
    let envelope = service.update_policy(&project, policy_id, data).await;

    assert!(envelope.is_success());
    let data = envelope.data.unwrap();
    assert_eq!(data["policyId"], json!(policy_id.as_uuid().to_string()));
    assert_eq!(data["name"], json!("p1-renamed"));

    let statements = warehouse.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].params["isDeleted"], json!(true));
    assert_eq!(metadata.calls(), vec![(project, vec![policy_id])]);
}

#[tokio::test]
async fn update_policy_refresh_failure_does_not_compensate() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    metadata.fail_with("refresh exploded");
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .update_policy(&ConfigFixtures::project(), PolicyId::new(), Row::new())
        .await;

    assert_eq!(envelope.code, Some(500));
    drain_background_tasks().await;
    // Exactly the one version insert, no tombstone follow-up
    assert_eq!(warehouse.statements().len(), 1);
}

#[tokio::test]
async fn delete_policy_returns_empty_data() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);
    let project = ConfigFixtures::project();
    let policy_id = PolicyId::new();

    let envelope = service.delete_policy(&project, policy_id, Row::new()).await;

    assert!(envelope.is_success());
    assert_eq!(envelope.data, Some(json!({})));

    let statements = warehouse.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].params["isDeleted"], json!(true));
    assert_eq!(
        statements[0].params["policyId"],
        json!(policy_id.as_uuid().to_string())
    );
    assert_eq!(metadata.calls(), vec![(project, vec![policy_id])]);
}

#[tokio::test]
async fn delete_policy_refresh_failure_does_not_compensate() {
    let warehouse = Arc::new(MockWarehouse::new());
    let metadata = Arc::new(MockMetadata::new());
    metadata.fail_with("refresh exploded");
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .delete_policy(&ConfigFixtures::project(), PolicyId::new(), Row::new())
        .await;

    assert_eq!(envelope.code, Some(500));
    assert!(envelope.errors[0].contains("refresh exploded"));
    drain_background_tasks().await;
    assert_eq!(warehouse.statements().len(), 1);
}

#[tokio::test]
async fn get_policy_returns_single_row() {
    let warehouse = Arc::new(MockWarehouse::new());
    let policy_id = PolicyId::new();
    warehouse.enqueue_rows(vec![PolicyFixtures::current_row(&policy_id)]);
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .get_policy(&ConfigFixtures::project(), policy_id)
        .await;

    assert!(envelope.is_success());
    let data = envelope.data.unwrap();
    assert_eq!(data["policyId"], json!(policy_id.as_uuid().to_string()));
    assert_eq!(data["isDeleted"], json!(false));
    // Reads never touch the metadata manager
    assert!(metadata.calls().is_empty());
}

#[tokio::test]
async fn get_policy_zero_rows_is_400_naming_the_view() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.enqueue_rows(Vec::new());
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .get_policy(&ConfigFixtures::project(), PolicyId::new())
        .await;

    assert_eq!(envelope.code, Some(400));
    assert!(envelope.errors[0].contains("policies_current"));
}

#[tokio::test]
async fn list_policies_unscoped_returns_rows() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.enqueue_rows(vec![
        PolicyFixtures::current_row(&PolicyId::new()),
        PolicyFixtures::current_row(&PolicyId::new()),
    ]);
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .list_policies(&ConfigFixtures::project(), None, None)
        .await;

    assert!(envelope.is_success());
    let Value::Array(rows) = envelope.data.unwrap() else {
        panic!("list data should be an array");
    };
    assert_eq!(rows.len(), 2);
    assert!(warehouse.statements()[0].sql.ends_with("LIMIT 10"));
}

#[tokio::test]
async fn list_policies_zero_rows_is_400() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.enqueue_rows(Vec::new());
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .list_policies(&ConfigFixtures::project(), None, None)
        .await;

    assert_eq!(envelope.code, Some(400));
    assert!(envelope.errors[0].contains("policies_current"));
}

#[tokio::test]
async fn list_policies_dataset_scope_wins_over_account_scope() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.enqueue_rows(vec![PolicyFixtures::current_row(&PolicyId::new())]);
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);

    let envelope = service
        .list_policies(
            &ConfigFixtures::project(),
            Some(DatasetId::new("ds-1")),
            Some(AccountId::new()),
        )
        .await;

    assert!(envelope.is_success());
    let statement = &warehouse.statements()[0];
    assert!(statement.sql.contains("@datasetId"));
    assert!(!statement.sql.contains("@accountId"));
    assert_eq!(statement.params["datasetId"], json!("ds-1"));
}

#[tokio::test]
async fn list_policies_account_scope_queries_account_links() {
    let warehouse = Arc::new(MockWarehouse::new());
    warehouse.enqueue_rows(vec![PolicyFixtures::current_row(&PolicyId::new())]);
    let metadata = Arc::new(MockMetadata::new());
    let service = build_service(&warehouse, &metadata);
    let account_id = AccountId::new();

    let envelope = service
        .list_policies(&ConfigFixtures::project(), None, Some(account_id))
        .await;

    assert!(envelope.is_success());
    let statement = &warehouse.statements()[0];
    assert!(statement.sql.contains("accounts_current"));
    assert_eq!(
        statement.params["accountId"],
        json!(account_id.as_uuid().to_string())
    );
}
