//! Graph importer: the four public write paths.
//!
//! Every entry point runs one import attempt per try inside the retry
//! controller and never returns an error. Failures are reported to the
//! event sink and the returned count says how many graph elements were
//! committed.

mod edge;
mod join;
mod vertex;

use std::sync::Arc;

use relgraph_core::{Edge, EdgeKind, Record, Vertex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::binder::OrderedBinder;
use crate::config::ImporterConfig;
use crate::connection::ConnectionProvider;
use crate::events::{EventSink, Target};
use crate::retry::RetryController;

pub use edge::FkLookup;

/// Writes vertices and edges into the graph target.
///
/// Holds no per-call state: concurrent calls each get their own connection
/// and transaction unit.
pub struct GraphImporter<P: ConnectionProvider> {
    provider: P,
    binder: OrderedBinder,
    config: ImporterConfig,
    sink: Arc<dyn EventSink>,
    retry: RetryController,
}

impl<P: ConnectionProvider> GraphImporter<P> {
    pub fn new(
        provider: P,
        config: ImporterConfig,
        sink: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Self {
        let retry = RetryController::new(config.retry.clone(), cancel);
        Self {
            provider,
            binder: OrderedBinder,
            config,
            sink,
            retry,
        }
    }

    /// Create one node per non-null record in a single batched unit.
    pub async fn import_vertex(&self, vertex: &Vertex, records: &[Option<Record>]) -> usize {
        info!(label = %vertex.label, owner = %vertex.owner, records = records.len(), "Importing vertex");
        let target = Target::Vertex(vertex.clone());
        let unit_target = &target;
        self.retry
            .run(self.sink.as_ref(), &target, records.len(), move || {
                self.vertex_attempt(unit_target, vertex, records)
            })
            .await
    }

    /// Create the relationships of an edge.
    ///
    /// Join-table edges go through [`Self::import_join_edge`]. Other kinds
    /// link per FK mapping: by full property match, or, when the run is
    /// incremental, only for the referenced rows present in `records`.
    pub async fn import_edge(&self, edge: &Edge, records: &[Option<Record>]) -> usize {
        if edge.kind == EdgeKind::JoinTable {
            return self.import_join_edge(edge, records).await;
        }

        info!(label = %edge.label, kind = %edge.kind, cdc = self.config.cdc, "Importing edge");
        let target = Target::Edge(edge.clone());
        let unit_target = &target;
        let attempted = edge.fk_mappings.len();
        if self.config.cdc {
            self.retry
                .run(self.sink.as_ref(), &target, attempted, move || {
                    self.cdc_attempt(unit_target, edge, records, FkLookup::Referenced)
                })
                .await
        } else {
            self.retry
                .run(self.sink.as_ref(), &target, attempted, move || {
                    self.simple_attempt(unit_target, edge)
                })
                .await
        }
    }

    /// Create one relationship per join-table row.
    pub async fn import_join_edge(&self, edge: &Edge, records: &[Option<Record>]) -> usize {
        info!(label = %edge.label, records = records.len(), "Importing join-table edge");
        let target = Target::Edge(edge.clone());
        let unit_target = &target;
        self.retry
            .run(
                self.sink.as_ref(),
                &target,
                edge.fk_mappings.len(),
                move || self.join_attempt(unit_target, edge, records),
            )
            .await
    }

    /// Link newly arrived rows of `vertex` to existing nodes through `edge`,
    /// looking each row up by its FK column values.
    pub async fn import_cdc_object(
        &self,
        vertex: &Vertex,
        edge: &Edge,
        records: &[Option<Record>],
    ) -> usize {
        info!(label = %vertex.label, edge = %edge.label, records = records.len(), "Importing CDC object");
        // Terminal failures are reported against the vertex, unit outcomes
        // against the edge.
        let target = Target::Vertex(vertex.clone());
        let edge_target = Target::Edge(edge.clone());
        let unit_target = &edge_target;
        self.retry
            .run(self.sink.as_ref(), &target, records.len(), move || {
                self.cdc_attempt(unit_target, edge, records, FkLookup::Referencing)
            })
            .await
    }
}
