//! Parameter binding.
//!
//! Fills a statement's placeholders from a record. Values are looked up by
//! column name, so the order of pairs in the record does not matter.

use relgraph_core::{Record, Value};

use crate::error::{ImportError, ImportResult};
use crate::query::Statement;

/// A statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub text: String,
    /// `params[i]` fills placeholder `$i`.
    pub params: Vec<Value>,
}

impl BoundStatement {
    /// A statement without placeholders.
    pub fn unbound(stmt: &Statement) -> Self {
        Self {
            text: stmt.text.clone(),
            params: Vec::new(),
        }
    }
}

/// Maps record values onto statement placeholders.
pub trait ParameterBinder: Send + Sync {
    /// Bind every placeholder from the record column recorded in its slot.
    fn bind(&self, record: &Record, stmt: &Statement) -> ImportResult<BoundStatement>;

    /// Bind placeholders from explicitly named columns, one per placeholder.
    fn bind_fk_lookup(
        &self,
        columns: &[&str],
        record: &Record,
        stmt: &Statement,
    ) -> ImportResult<BoundStatement>;
}

/// Default binder: positional output, by-name lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedBinder;

impl OrderedBinder {
    fn lookup(record: &Record, column: &str) -> ImportResult<Value> {
        record
            .get(column)
            .cloned()
            .ok_or_else(|| ImportError::Binding {
                column: column.to_string(),
            })
    }
}

impl ParameterBinder for OrderedBinder {
    fn bind(&self, record: &Record, stmt: &Statement) -> ImportResult<BoundStatement> {
        let params = stmt
            .slots
            .iter()
            .map(|slot| Self::lookup(record, slot))
            .collect::<ImportResult<Vec<_>>>()?;
        Ok(BoundStatement {
            text: stmt.text.clone(),
            params,
        })
    }

    fn bind_fk_lookup(
        &self,
        columns: &[&str],
        record: &Record,
        stmt: &Statement,
    ) -> ImportResult<BoundStatement> {
        let params = stmt
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| Self::lookup(record, columns.get(i).copied().unwrap_or(slot)))
            .collect::<ImportResult<Vec<_>>>()?;
        Ok(BoundStatement {
            text: stmt.text.clone(),
            params,
        })
    }
}
