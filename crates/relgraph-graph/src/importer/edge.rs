//! FK edge import, full and incremental.
//!
//! Both paths work per FK mapping and commit after every statement, so one
//! failing mapping only loses its own relationships.

use relgraph_core::{Edge, Record};

use super::GraphImporter;
use crate::binder::{BoundStatement, ParameterBinder};
use crate::connection::ConnectionProvider;
use crate::error::ImportResult;
use crate::events::Target;
use crate::query::{self, Statement};
use crate::unit::{CommitMode, TransactionUnit, UnitPlan};

/// Which record column supplies the pinned value of a CDC statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkLookup {
    /// Records are rows of the referenced table.
    Referenced,
    /// Records are rows of the referencing table.
    Referencing,
}

/// One statement per FK mapping index, no parameters.
struct MappingPlan<'a> {
    target: &'a Target,
    statements: Vec<Option<Statement>>,
}

impl UnitPlan for MappingPlan<'_> {
    type Item = usize;

    fn target(&self) -> &Target {
        self.target
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::EachItem
    }

    fn statement(&self, index: &usize) -> Option<&Statement> {
        self.statements.get(*index).and_then(Option::as_ref)
    }

    fn bind(&self, stmt: &Statement, _index: &usize) -> ImportResult<BoundStatement> {
        Ok(BoundStatement::unbound(stmt))
    }
}

/// One statement per (record, FK mapping index) pair.
struct CdcPlan<'a> {
    target: &'a Target,
    binder: &'a dyn ParameterBinder,
    statements: Vec<Option<Statement>>,
    lookups: Vec<String>,
}

impl<'a> UnitPlan for CdcPlan<'a> {
    type Item = (&'a Record, usize);

    fn target(&self) -> &Target {
        self.target
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::EachItem
    }

    fn statement(&self, item: &Self::Item) -> Option<&Statement> {
        self.statements.get(item.1).and_then(Option::as_ref)
    }

    fn bind(&self, stmt: &Statement, item: &Self::Item) -> ImportResult<BoundStatement> {
        let (record, index) = *item;
        let column = self.lookups[index].as_str();
        self.binder.bind_fk_lookup(&[column], record, stmt)
    }

    fn record<'i>(&self, item: &'i Self::Item) -> Option<&'i Record> {
        Some(item.0)
    }
}

impl<P: ConnectionProvider> GraphImporter<P> {
    pub(super) async fn simple_attempt(&self, target: &Target, edge: &Edge) -> ImportResult<usize> {
        edge.validate()?;

        let mut unit =
            TransactionUnit::begin(&self.provider, &self.config.signatures, self.sink.as_ref())
                .await?;

        let plan = MappingPlan {
            target,
            statements: (0..edge.fk_mappings.len())
                .map(|i| query::edge_create(edge, i))
                .collect(),
        };
        let indices: Vec<usize> = (0..edge.fk_mappings.len()).collect();
        unit.run(&plan, &indices).await
    }

    pub(super) async fn cdc_attempt(
        &self,
        target: &Target,
        edge: &Edge,
        records: &[Option<Record>],
        lookup: FkLookup,
    ) -> ImportResult<usize> {
        edge.validate()?;

        let mut unit =
            TransactionUnit::begin(&self.provider, &self.config.signatures, self.sink.as_ref())
                .await?;

        // Statements only differ per mapping, so build them once.
        let plan = CdcPlan {
            target,
            binder: &self.binder,
            statements: (0..edge.fk_mappings.len())
                .map(|i| query::cdc_edge_create(edge, i))
                .collect(),
            lookups: edge
                .fk_mappings
                .iter()
                .map(|m| match lookup {
                    FkLookup::Referenced => m.ref_column.clone(),
                    FkLookup::Referencing => m.fk_column.clone(),
                })
                .collect(),
        };
        let items: Vec<(&Record, usize)> = records
            .iter()
            .flatten()
            .flat_map(|record| (0..edge.fk_mappings.len()).map(move |i| (record, i)))
            .collect();
        unit.run(&plan, &items).await
    }
}
