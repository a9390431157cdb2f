//! Edge templates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Column;
use crate::{ModelError, ModelResult};

/// Cardinality shape of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// `(start)-[r]->(end)`, one relationship per FK mapping.
    Simple,
    /// Same match as `Simple`, relationship created end to start.
    TwoWay,
    /// Many-to-many collapsed from an association table.
    JoinTable,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "SIMPLE",
            Self::TwoWay => "TWO_WAY",
            Self::JoinTable => "JOIN_TABLE",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A referencing column and the column it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkMapping {
    pub fk_column: String,
    pub ref_column: String,
}

impl FkMapping {
    pub fn new(fk_column: impl Into<String>, ref_column: impl Into<String>) -> Self {
        Self {
            fk_column: fk_column.into(),
            ref_column: ref_column.into(),
        }
    }
}

/// A graph relationship template derived from a foreign key or a join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub start_label: String,
    pub end_label: String,
    pub label: String,
    pub kind: EdgeKind,
    pub fk_mappings: Vec<FkMapping>,
    /// Properties carried on the relationship (join-table edges only).
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Edge {
    pub fn new(
        start_label: impl Into<String>,
        end_label: impl Into<String>,
        label: impl Into<String>,
        kind: EdgeKind,
        fk_mappings: Vec<FkMapping>,
    ) -> Self {
        Self {
            start_label: start_label.into(),
            end_label: end_label.into(),
            label: label.into(),
            kind,
            fk_mappings,
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.start_label.trim().is_empty() || self.end_label.trim().is_empty() {
            return Err(ModelError::EmptyEndpoint(self.label.clone()));
        }
        let found = self.fk_mappings.len();
        let ok = match self.kind {
            EdgeKind::JoinTable => found == 2,
            EdgeKind::Simple | EdgeKind::TwoWay => found >= 1,
        };
        if !ok {
            return Err(ModelError::MappingArity {
                label: self.label.clone(),
                kind: self.kind.to_string(),
                expected: match self.kind {
                    EdgeKind::JoinTable => "exactly 2".to_string(),
                    _ => "at least 1".to_string(),
                },
                found,
            });
        }
        Ok(())
    }

    pub fn mapping(&self, index: usize) -> Option<&FkMapping> {
        self.fk_mappings.get(index)
    }

    /// Start and end are the same node type.
    pub fn is_self_referencing(&self) -> bool {
        self.start_label == self.end_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_table_needs_two_mappings() {
        let e = Edge::new(
            "Student",
            "Course",
            "ENROLLED",
            EdgeKind::JoinTable,
            vec![FkMapping::new("student_id", "id")],
        );
        assert!(matches!(
            e.validate(),
            Err(ModelError::MappingArity { found: 1, .. })
        ));
    }

    #[test]
    fn test_simple_edge_needs_a_mapping() {
        let e = Edge::new("Order", "Customer", "PLACED_BY", EdgeKind::Simple, vec![]);
        assert!(e.validate().is_err());

        let e = Edge::new(
            "Order",
            "Customer",
            "PLACED_BY",
            EdgeKind::Simple,
            vec![FkMapping::new("customer_id", "id")],
        );
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: EdgeKind = serde_json::from_str("\"TWO_WAY\"").unwrap();
        assert_eq!(kind, EdgeKind::TwoWay);
        assert_eq!(serde_json::to_string(&EdgeKind::JoinTable).unwrap(), "\"JOIN_TABLE\"");
    }
}
