//! Transient failure classification.
//!
//! A failure is retryable when its message contains one of the configured
//! signatures or its vendor code is one of the configured codes. Anything
//! else is treated as fatal by the retry loop.

use serde::Deserialize;

use crate::error::{DbError, ImportError};

/// Message fragments and vendor codes that mark a dropped connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransientSignatures {
    pub messages: Vec<String>,
    pub codes: Vec<String>,
}

impl Default for TransientSignatures {
    /// Signatures of a broker-backed JDBC target.
    fn default() -> Self {
        Self {
            messages: vec![
                "Connection or Statement might be closed".to_string(),
                "Cannot communicate with the broker".to_string(),
            ],
            codes: vec![
                "-2019".to_string(),
                "-21003".to_string(),
                "-2003".to_string(),
            ],
        }
    }
}

impl TransientSignatures {
    /// Signatures for a Neo4j target reached over bolt with neo4rs.
    pub fn bolt() -> Self {
        Self {
            messages: vec![
                "an IO error occurred".to_string(),
                "connection error".to_string(),
                "Neo.TransientError".to_string(),
                "Connection reset".to_string(),
                "Broken pipe".to_string(),
            ],
            codes: Vec::new(),
        }
    }

    pub fn is_retryable(&self, err: &DbError) -> bool {
        if self
            .messages
            .iter()
            .any(|sig| !sig.is_empty() && err.message.contains(sig.as_str()))
        {
            return true;
        }
        match &err.code {
            Some(code) => self.codes.iter().any(|c| c == code),
            None => false,
        }
    }

    /// Wrap a statement-level failure as transient or fatal.
    pub fn classify(&self, err: DbError) -> ImportError {
        if self.is_retryable(&err) {
            ImportError::Transient(err)
        } else {
            ImportError::Statement(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_signatures() {
        let sigs = TransientSignatures::default();
        assert!(sigs.is_retryable(&DbError::new(
            "Connection or Statement might be closed by server"
        )));
        assert!(sigs.is_retryable(&DbError::new("Cannot communicate with the broker")));
        assert!(!sigs.is_retryable(&DbError::new("Syntax error near 'MATCH'")));
    }

    #[test]
    fn test_each_code_is_retryable_alone() {
        let sigs = TransientSignatures::default();
        for code in ["-2019", "-21003", "-2003"] {
            assert!(sigs.is_retryable(&DbError::with_code("dropped", code)), "{code}");
        }
        assert!(!sigs.is_retryable(&DbError::with_code("constraint", "-494")));
    }

    #[test]
    fn test_custom_backend_signatures() {
        let sigs = TransientSignatures {
            messages: vec!["socket hung up".to_string()],
            codes: Vec::new(),
        };
        assert!(sigs.is_retryable(&DbError::new("error: socket hung up")));
        assert!(!sigs.is_retryable(&DbError::new("Cannot communicate with the broker")));
    }

    #[test]
    fn test_bolt_preset() {
        let sigs = TransientSignatures::bolt();
        assert!(sigs.is_retryable(&DbError::new("connection error")));
        assert!(matches!(
            sigs.classify(DbError::new("Neo.ClientError.Statement.SyntaxError")),
            ImportError::Statement(_)
        ));
    }

    #[test]
    fn test_empty_signature_never_matches() {
        let sigs = TransientSignatures {
            messages: vec![String::new()],
            codes: Vec::new(),
        };
        assert!(!sigs.is_retryable(&DbError::new("anything")));
    }
}
