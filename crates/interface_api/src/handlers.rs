//! Policy handlers
//!
//! Each handler parses path and body input, delegates to the service, and
//! renders the envelope. Malformed identifiers and non-object bodies are
//! rejected with a 400 envelope before the service is involved.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use core_kernel::{AccountId, DatasetId, PolicyId, ProjectId};
use domain_policy::ports::Row;
use domain_policy::Envelope;

use crate::AppState;

/// Optional scopes of the list operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub dataset_id: Option<String>,
    pub account_id: Option<String>,
}

/// Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Lists current policies, optionally dataset- or account-scoped
pub async fn list_policies(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let account_id = match query.account_id.as_deref().map(str::parse::<AccountId>) {
        Some(Err(_)) => {
            return envelope_response(Envelope::failure(400, "Invalid accountId"));
        }
        Some(Ok(account)) => Some(account),
        None => None,
    };
    let dataset_id = query.dataset_id.map(DatasetId::new);

    let envelope = state
        .service
        .list_policies(&ProjectId::new(project), dataset_id, account_id)
        .await;
    envelope_response(envelope)
}

/// Creates a policy from the supplied business attributes
pub async fn create_policy(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(data) = body else {
        return envelope_response(Envelope::failure(400, "Request body must be a JSON object"));
    };
    envelope_response(
        state
            .service
            .create_policy(&ProjectId::new(project), data)
            .await,
    )
}

/// Gets the current state of a policy
pub async fn get_policy(
    State(state): State<AppState>,
    Path((project, policy_id)): Path<(String, String)>,
) -> Response {
    let Ok(policy_id) = policy_id.parse::<PolicyId>() else {
        return envelope_response(Envelope::failure(400, "Invalid policyId"));
    };
    envelope_response(
        state
            .service
            .get_policy(&ProjectId::new(project), policy_id)
            .await,
    )
}

/// Writes a new version row for a policy
pub async fn update_policy(
    State(state): State<AppState>,
    Path((project, policy_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Ok(policy_id) = policy_id.parse::<PolicyId>() else {
        return envelope_response(Envelope::failure(400, "Invalid policyId"));
    };
    let Value::Object(data) = body else {
        return envelope_response(Envelope::failure(400, "Request body must be a JSON object"));
    };
    envelope_response(
        state
            .service
            .update_policy(&ProjectId::new(project), policy_id, data)
            .await,
    )
}

/// Tombstones a policy
pub async fn delete_policy(
    State(state): State<AppState>,
    Path((project, policy_id)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> Response {
    let Ok(policy_id) = policy_id.parse::<PolicyId>() else {
        return envelope_response(Envelope::failure(400, "Invalid policyId"));
    };
    let data = match body {
        Some(Json(Value::Object(data))) => data,
        Some(_) => {
            return envelope_response(Envelope::failure(400, "Request body must be a JSON object"));
        }
        None => Row::new(),
    };
    envelope_response(
        state
            .service
            .delete_policy(&ProjectId::new(project), policy_id, data)
            .await,
    )
}

fn envelope_response(envelope: Envelope) -> Response {
    let status = match envelope.code {
        Some(code) => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        None => StatusCode::OK,
    };
    (status, Json(envelope)).into_response()
}
