//! Scripted in-memory target for importer tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use relgraph_core::{Column, Record, Value};
use relgraph_graph::{
    BoundStatement, CollectingSink, ConnectionProvider, DbError, GraphImporter, ImporterConfig,
    TargetConnection,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct MockState {
    /// Results for single executions; `Ok(1)` once exhausted.
    pub responses: VecDeque<Result<i64, DbError>>,
    /// Results for batches; one affected row per statement once exhausted.
    pub batch_responses: VecDeque<Result<Vec<i64>, DbError>>,
    pub acquire_errors: VecDeque<DbError>,
    /// Results for successive commits; `Ok` once exhausted.
    pub commit_results: VecDeque<Result<(), DbError>>,
    pub rollback_results: VecDeque<Result<(), DbError>>,
    /// Hand out connections that already have auto-commit off.
    pub manual_commit: bool,
    pub executed: Vec<BoundStatement>,
    pub batches: Vec<Vec<BoundStatement>>,
    pub commits: usize,
    pub rollbacks: usize,
    pub acquired: usize,
    /// Auto-commit mode of each connection when it was handed back.
    pub released: Vec<bool>,
}

#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn respond(&self, response: Result<i64, DbError>) -> &Self {
        self.state().responses.push_back(response);
        self
    }

    pub fn respond_batch(&self, response: Result<Vec<i64>, DbError>) -> &Self {
        self.state().batch_responses.push_back(response);
        self
    }

    pub fn fail_acquire(&self, err: DbError) -> &Self {
        self.state().acquire_errors.push_back(err);
        self
    }

    pub fn respond_commit(&self, result: Result<(), DbError>) -> &Self {
        self.state().commit_results.push_back(result);
        self
    }

    pub fn respond_rollback(&self, result: Result<(), DbError>) -> &Self {
        self.state().rollback_results.push_back(result);
        self
    }

    pub fn manual_commit(&self) -> &Self {
        self.state().manual_commit = true;
        self
    }
}

pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
    auto_commit: bool,
}

#[async_trait]
impl TargetConnection for MockConnection {
    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, enabled: bool) {
        self.auto_commit = enabled;
    }

    async fn execute(&mut self, stmt: &BoundStatement) -> Result<i64, DbError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(stmt.clone());
        state.responses.pop_front().unwrap_or(Ok(1))
    }

    async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<i64>, DbError> {
        let mut state = self.state.lock().unwrap();
        state.batches.push(batch.to_vec());
        state
            .batch_responses
            .pop_front()
            .unwrap_or_else(|| Ok(vec![1; batch.len()]))
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let result = state.commit_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            state.commits += 1;
        }
        result
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.rollbacks += 1;
        state.rollback_results.pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    type Connection = MockConnection;

    async fn acquire(&self) -> Result<MockConnection, DbError> {
        let mut state = self.state();
        if let Some(err) = state.acquire_errors.pop_front() {
            return Err(err);
        }
        state.acquired += 1;
        Ok(MockConnection {
            state: self.state.clone(),
            auto_commit: !state.manual_commit,
        })
    }

    fn release(&self, conn: MockConnection) {
        self.state().released.push(conn.auto_commit);
    }
}

pub fn importer(
    provider: &MockProvider,
    config: ImporterConfig,
) -> (GraphImporter<MockProvider>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let importer = GraphImporter::new(
        provider.clone(),
        config,
        sink.clone(),
        CancellationToken::new(),
    );
    (importer, sink)
}

pub fn record(pairs: &[(&str, Value)]) -> Record {
    Record::from_pairs(
        pairs
            .iter()
            .map(|(name, value)| (Column::new(*name), value.clone())),
    )
}

pub fn broker_down() -> DbError {
    DbError::new("Cannot communicate with the broker")
}

pub fn syntax_error() -> DbError {
    DbError::with_code("Invalid input 'X'", "-494")
}

pub fn constraint_violation() -> DbError {
    DbError::with_code(
        "Node already exists with label `Order`",
        "Neo.ClientError.Schema.ConstraintValidationFailed",
    )
}
