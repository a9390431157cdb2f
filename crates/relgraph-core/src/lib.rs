//! relgraph core library
//!
//! Definitions shared by the import engine and the CLI: vertex and edge
//! templates derived from relational tables, column descriptors, and the
//! source records handed over by the extraction layer.

pub mod error;
pub mod model;

pub use error::{ModelError, ModelResult};
pub use model::{
    Column, ColumnValue, Edge, EdgeKind, FkMapping, GraphDataType, Record, Value, Vertex,
};
