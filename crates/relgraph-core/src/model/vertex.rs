//! Vertex templates.

use serde::{Deserialize, Serialize};

use super::Column;
use crate::{ModelError, ModelResult};

/// A graph node template derived from one relational table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub label: String,
    /// Source table the vertex is mapped from.
    pub owner: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Vertex {
    pub fn new(label: impl Into<String>, owner: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            label: label.into(),
            owner: owner.into(),
            columns,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.label.trim().is_empty() {
            return Err(ModelError::EmptyLabel(self.owner.clone()));
        }
        Ok(())
    }

    /// Columns that participate in the migration.
    pub fn selected_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.selected)
    }

    /// Columns that end up as node properties, in declaration order.
    pub fn eligible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_eligible())
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_columns().any(|c| c.matches(name))
    }
}
