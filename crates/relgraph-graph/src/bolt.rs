//! Neo4j connection provider over bolt.

use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Graph, Query, Row, Txn};
use relgraph_core::Value;
use serde::Deserialize;

use crate::binder::BoundStatement;
use crate::connection::{ConnectionProvider, TargetConnection};
use crate::error::DbError;
use crate::query::COUNT_COLUMN;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub db: String,
    pub max_connections: usize,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            db: "neo4j".to_string(),
            max_connections: 8,
            fetch_size: 200,
        }
    }
}

/// Hands out bolt sessions from a neo4rs pool.
#[derive(Clone)]
pub struct BoltProvider {
    graph: Graph,
}

impl BoltProvider {
    /// Create the pool and ping the server.
    ///
    /// `Graph::connect` only builds the lazy pool; the `RETURN 1` forces a
    /// real handshake so an unreachable server fails here.
    pub async fn connect(config: &GraphConfig) -> Result<Self, DbError> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.db.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()?;

        let graph = Graph::connect(neo4j_config).await?;
        graph.run(Query::new("RETURN 1".to_string())).await?;

        Ok(Self { graph })
    }
}

#[async_trait]
impl ConnectionProvider for BoltProvider {
    type Connection = BoltConnection;

    async fn acquire(&self) -> Result<BoltConnection, DbError> {
        Ok(BoltConnection {
            graph: self.graph.clone(),
            txn: None,
            auto_commit: true,
        })
    }

    // Dropping the session hands its pooled connection back.
    fn release(&self, _conn: BoltConnection) {}
}

/// A bolt session. In manual-commit mode statements run inside a lazily
/// started explicit transaction.
pub struct BoltConnection {
    graph: Graph,
    txn: Option<Txn>,
    auto_commit: bool,
}

impl BoltConnection {
    async fn open_txn(&mut self) -> Result<&mut Txn, DbError> {
        if self.txn.is_none() {
            self.txn = Some(self.graph.start_txn().await?);
        }
        self.txn
            .as_mut()
            .ok_or_else(|| DbError::new("transaction could not be started"))
    }

    async fn run_counted(&mut self, stmt: &BoundStatement, count_rows: bool) -> Result<i64, DbError> {
        let query = to_query(stmt);
        let mut rows = Vec::new();
        if self.auto_commit {
            let mut stream = self.graph.execute(query).await?;
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
        } else {
            let txn = self.open_txn().await?;
            let mut stream = txn.execute(query).await?;
            while let Some(row) = stream.next(txn.handle()).await? {
                rows.push(row);
            }
        }

        if count_rows {
            Ok(rows.len() as i64)
        } else {
            match rows.first() {
                Some(row) => read_count(row),
                None => Ok(0),
            }
        }
    }
}

#[async_trait]
impl TargetConnection for BoltConnection {
    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, enabled: bool) {
        if enabled {
            // Switching back discards uncommitted work.
            self.txn = None;
        }
        self.auto_commit = enabled;
    }

    async fn execute(&mut self, stmt: &BoundStatement) -> Result<i64, DbError> {
        self.run_counted(stmt, false).await
    }

    async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<i64>, DbError> {
        let mut affected = Vec::with_capacity(batch.len());
        for stmt in batch {
            affected.push(self.run_counted(stmt, true).await?);
        }
        Ok(affected)
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        if let Some(txn) = self.txn.take() {
            txn.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        if let Some(txn) = self.txn.take() {
            txn.rollback().await?;
        }
        Ok(())
    }
}

fn read_count(row: &Row) -> Result<i64, DbError> {
    let count: i64 = row
        .get(COUNT_COLUMN)
        .map_err(|e| DbError::new(format!("Failed to get field '{}': {:?}", COUNT_COLUMN, e)))?;
    Ok(count)
}

/// Numbered parameters: `$0` is bound under key `"0"`.
fn to_query(stmt: &BoundStatement) -> Query {
    stmt.params
        .iter()
        .enumerate()
        .fold(Query::new(stmt.text.clone()), |query, (i, value)| {
            query.param(&i.to_string(), to_bolt(value))
        })
}

/// Temporal values go over the wire as ISO strings; the statement wraps them
/// in `date()` / `datetime()`.
fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Int(i) => BoltType::from(*i),
        Value::Float(x) => BoltType::from(*x),
        Value::Text(s) => BoltType::from(s.as_str()),
        Value::Date(_) | Value::DateTime(_) => BoltType::from(value.to_string()),
    }
}
