//! Join-table edge import: one statement re-bound per row, one commit.

use relgraph_core::{Edge, Record};

use super::GraphImporter;
use crate::binder::{BoundStatement, ParameterBinder};
use crate::connection::ConnectionProvider;
use crate::error::{ImportError, ImportResult};
use crate::events::{ImportEvent, Target};
use crate::query::{self, Statement};
use crate::unit::{CommitMode, TransactionUnit, UnitPlan};

struct JoinPlan<'a> {
    target: &'a Target,
    binder: &'a dyn ParameterBinder,
    statement: Statement,
}

impl<'a> UnitPlan for JoinPlan<'a> {
    type Item = &'a Record;

    fn target(&self) -> &Target {
        self.target
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::Once
    }

    fn statement(&self, _record: &Self::Item) -> Option<&Statement> {
        Some(&self.statement)
    }

    fn bind(&self, stmt: &Statement, record: &Self::Item) -> ImportResult<BoundStatement> {
        self.binder.bind(record, stmt)
    }

    fn record<'i>(&self, record: &'i Self::Item) -> Option<&'i Record> {
        Some(*record)
    }
}

impl<P: ConnectionProvider> GraphImporter<P> {
    pub(super) async fn join_attempt(
        &self,
        target: &Target,
        edge: &Edge,
        records: &[Option<Record>],
    ) -> ImportResult<usize> {
        edge.validate()?;
        let Some(statement) = query::join_edge_create(edge) else {
            self.sink.handle(ImportEvent::RecordFailed {
                record: None,
                error: ImportError::NoSupportedColumn {
                    label: edge.label.clone(),
                },
            });
            return Ok(0);
        };

        let mut unit =
            TransactionUnit::begin(&self.provider, &self.config.signatures, self.sink.as_ref())
                .await?;

        let plan = JoinPlan {
            target,
            binder: &self.binder,
            statement,
        };
        let rows: Vec<&Record> = records.iter().flatten().collect();
        unit.run(&plan, &rows).await
    }
}
