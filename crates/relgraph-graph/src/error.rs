//! Error types for the import engine.

use std::fmt;

use relgraph_core::ModelError;
use thiserror::Error;

/// A failure reported by the target database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    pub message: String,
    /// Vendor error code, when the backend supplies one.
    pub code: Option<String>,
}

impl DbError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DbError {}

impl From<neo4rs::Error> for DbError {
    fn from(err: neo4rs::Error) -> Self {
        let code = match &err {
            neo4rs::Error::Neo4j(e) => Some(e.code().to_string()),
            _ => None,
        };
        DbError {
            message: err.to_string(),
            code,
        }
    }
}

/// Errors produced while importing into the graph target.
#[derive(Error, Debug, Clone)]
pub enum ImportError {
    #[error("Transient target failure: {0}")]
    Transient(DbError),

    #[error("Statement failed: {0}")]
    Statement(DbError),

    #[error("Could not use target connection: {0}")]
    Connection(DbError),

    #[error("No value for column '{column}' in record")]
    Binding { column: String },

    #[error("There is not a single supported column in '{label}'")]
    NoSupportedColumn { label: String },

    #[error("Invalid definition: {0}")]
    Definition(#[from] ModelError),

    #[error("Import cancelled")]
    Cancelled,
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

impl ImportError {
    /// Only transient connectivity failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImportError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_appends_code() {
        let err = DbError::with_code(
            "Node already exists",
            "Neo.ClientError.Schema.ConstraintValidationFailed",
        );
        assert_eq!(
            err.to_string(),
            "Node already exists (code Neo.ClientError.Schema.ConstraintValidationFailed)"
        );
        assert_eq!(DbError::new("closed").to_string(), "closed");
    }

    #[test]
    fn test_driver_error_without_server_code() {
        let err = DbError::from(neo4rs::Error::ConnectionError);
        assert_eq!(err.code, None);
        assert_eq!(err.message, neo4rs::Error::ConnectionError.to_string());
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(ImportError::Transient(DbError::new("down")).is_retryable());
        assert!(!ImportError::Statement(DbError::new("bad")).is_retryable());
        assert!(!ImportError::Cancelled.is_retryable());
    }
}
