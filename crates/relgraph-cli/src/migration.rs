//! Migration plan files.
//!
//! A plan holds the vertex and edge definitions of one run together with the
//! rows already extracted from the source database. Rows are JSON objects
//! keyed by source column name; `null` stands for a row that could not be
//! read.
//!
//! ```json
//! {
//!   "vertices": [
//!     {"label": "Person", "owner": "person",
//!      "columns": [{"name": "id"}, {"name": "born", "graph_data_type": "date"}],
//!      "rows": [{"id": 1, "born": "1980-05-01"}, null]}
//!   ],
//!   "edges": [
//!     {"start_label": "Order", "end_label": "Person", "label": "PLACED_BY",
//!      "kind": "SIMPLE", "fk_mappings": [{"fk_column": "person_id", "ref_column": "id"}]}
//!   ],
//!   "cdc_objects": [{"vertex": "Order", "edge": "PLACED_BY", "rows": []}]
//! }
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use relgraph_core::{Column, Edge, Record, Value, Vertex};
use serde::Deserialize;

pub type Row = Option<serde_json::Map<String, serde_json::Value>>;

#[derive(Debug, Deserialize)]
pub struct MigrationPlan {
    #[serde(default)]
    pub vertices: Vec<VertexPlan>,
    #[serde(default)]
    pub edges: Vec<EdgePlan>,
    #[serde(default)]
    pub cdc_objects: Vec<CdcObjectPlan>,
}

#[derive(Debug, Deserialize)]
pub struct VertexPlan {
    #[serde(flatten)]
    pub vertex: Vertex,
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub struct EdgePlan {
    #[serde(flatten)]
    pub edge: Edge,
    /// Join-table rows, or referenced rows for incremental linking.
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Newly arrived rows of a vertex to link through one of its edges.
#[derive(Debug, Deserialize)]
pub struct CdcObjectPlan {
    pub vertex: String,
    pub edge: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl MigrationPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid plan {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let plan: Self = serde_json::from_str(text)?;
        plan.check_references()?;
        Ok(plan)
    }

    fn check_references(&self) -> Result<()> {
        for object in &self.cdc_objects {
            if self.vertex(&object.vertex).is_none() {
                bail!("CDC object refers to unknown vertex '{}'", object.vertex);
            }
            if self.edge(&object.edge).is_none() {
                bail!("CDC object refers to unknown edge '{}'", object.edge);
            }
        }
        Ok(())
    }

    pub fn vertex(&self, label: &str) -> Option<&Vertex> {
        self.vertices
            .iter()
            .map(|v| &v.vertex)
            .find(|v| v.label == label)
    }

    pub fn edge(&self, label: &str) -> Option<&Edge> {
        self.edges.iter().map(|e| &e.edge).find(|e| e.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.cdc_objects.is_empty()
    }
}

/// Turn JSON rows into source records.
///
/// Fields named like a declared column take that column's descriptor, so
/// its graph type travels with the value.
pub fn to_records(columns: &[Column], rows: &[Row]) -> Vec<Option<Record>> {
    rows.iter()
        .map(|row| {
            row.as_ref().map(|fields| {
                Record::from_pairs(fields.iter().map(|(name, value)| {
                    let column = columns
                        .iter()
                        .find(|c| c.matches(name))
                        .cloned()
                        .unwrap_or_else(|| Column::new(name.as_str()));
                    (column, Value::from_json(value))
                }))
            })
        })
        .collect()
}
