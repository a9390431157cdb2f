//! Error types for definition handling.

use thiserror::Error;

/// Errors raised while validating vertex and edge definitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Vertex label is empty (source table '{0}')")]
    EmptyLabel(String),

    #[error("Edge '{0}' has an empty start or end vertex label")]
    EmptyEndpoint(String),

    #[error("Edge '{label}' of kind {kind} needs {expected} FK mappings, found {found}")]
    MappingArity {
        label: String,
        kind: String,
        expected: String,
        found: usize,
    },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
