//! Recording mocks for the warehouse and metadata ports

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use core_kernel::{PolicyId, ProjectId, Statement};
use domain_policy::ports::{MetadataError, MetadataPort, Row, WarehouseError, WarehousePort};

/// In-process [`WarehousePort`] double.
///
/// Captures every executed statement and replays scripted responses in FIFO
/// order. With an empty script every statement succeeds with zero rows, which
/// is the client's success signal for writes.
#[derive(Default)]
pub struct MockWarehouse {
    statements: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<Result<Vec<Row>, WarehouseError>>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful response carrying the given rows.
    pub fn enqueue_rows(&self, rows: Vec<Row>) {
        self.responses.lock().unwrap().push_back(Ok(rows));
    }

    /// Scripts a successful empty response (the write-success signal).
    pub fn enqueue_empty(&self) {
        self.enqueue_rows(Vec::new());
    }

    /// Scripts a failure.
    pub fn enqueue_error(&self, error: WarehouseError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Everything executed so far, in order.
    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarehousePort for MockWarehouse {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError> {
        self.statements.lock().unwrap().push(statement.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// In-process [`MetadataPort`] double.
///
/// Records every refresh call; fails all calls once [`MockMetadata::fail_with`]
/// has been set.
#[derive(Default)]
pub struct MockMetadata {
    calls: Mutex<Vec<(ProjectId, Vec<PolicyId>)>>,
    failure: Mutex<Option<String>>,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent refresh fail with this message.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    /// Recorded refresh calls, in order.
    pub fn calls(&self) -> Vec<(ProjectId, Vec<PolicyId>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataPort for MockMetadata {
    async fn refresh_policies(
        &self,
        project: &ProjectId,
        policy_ids: &[PolicyId],
    ) -> Result<(), MetadataError> {
        self.calls
            .lock()
            .unwrap()
            .push((project.clone(), policy_ids.to_vec()));
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(MetadataError::new(message.clone())),
            None => Ok(()),
        }
    }
}
