//! Vertex, edge and record models.

mod column;
mod edge;
mod record;
mod vertex;

pub use column::{Column, GraphDataType};
pub use edge::{Edge, EdgeKind, FkMapping};
pub use record::{ColumnValue, Record, Value};
pub use vertex::Vertex;
