//! Importer configuration.
//!
//! Loaded once per run from an optional TOML file, with connection settings
//! overridable from the environment:
//!
//! ```toml
//! cdc = false
//! write_error_records = true
//!
//! [target]
//! uri = "bolt://localhost:7687"
//!
//! [retry]
//! max_retries = 3
//! backoff_ms = 2000
//!
//! [signatures]
//! messages = ["connection error"]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::bolt::GraphConfig;
use crate::classifier::TransientSignatures;
use crate::retry::RetryPolicy;

pub const ENV_URI: &str = "RELGRAPH_NEO4J_URI";
pub const ENV_USER: &str = "RELGRAPH_NEO4J_USER";
pub const ENV_PASSWORD: &str = "RELGRAPH_NEO4J_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Run-wide settings injected into the importer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub target: GraphConfig,
    pub retry: RetryPolicy,
    pub signatures: TransientSignatures,
    /// Link FK edges incrementally instead of by full property match.
    pub cdc: bool,
    /// Keep the target records of rolled-back vertex batches in the event.
    pub write_error_records: bool,
}

impl ImporterConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read the file if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_inner(path, None)
    }

    /// Like [`Self::load`], with `signatures` standing in for the built-in
    /// set when the file has no `[signatures]` table.
    pub fn load_with_signatures(
        path: Option<&Path>,
        signatures: TransientSignatures,
    ) -> Result<Self, ConfigError> {
        Self::load_inner(path, Some(signatures))
    }

    fn load_inner(
        path: Option<&Path>,
        signatures: Option<TransientSignatures>,
    ) -> Result<Self, ConfigError> {
        let text = path.map(std::fs::read_to_string).transpose()?;
        let mut config = Self::parse(text.as_deref(), signatures)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn parse(
        text: Option<&str>,
        signatures: Option<TransientSignatures>,
    ) -> Result<Self, ConfigError> {
        let (mut config, has_signatures) = match text {
            Some(text) => {
                let table: toml::Table = text.parse()?;
                (Self::from_toml(text)?, table.contains_key("signatures"))
            }
            None => (Self::default(), false),
        };
        if let (Some(signatures), false) = (signatures, has_signatures) {
            config.signatures = signatures;
        }
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(uri) = var(ENV_URI) {
            self.target.uri = uri;
        }
        if let Some(user) = var(ENV_USER) {
            self.target.user = user;
        }
        if let Some(password) = var(ENV_PASSWORD) {
            self.target.password = password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = ImporterConfig::default();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff(), Duration::from_millis(2000));
        assert!(!config.cdc);
        assert_eq!(config.target.uri, "bolt://localhost:7687");
        assert_eq!(config.signatures, TransientSignatures::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ImporterConfig::from_toml(
            r#"
            cdc = true

            [target]
            uri = "bolt://graph:7687"

            [retry]
            backoff_ms = 10

            [signatures]
            messages = ["socket closed"]
            "#,
        )
        .unwrap();
        assert!(config.cdc);
        assert_eq!(config.target.uri, "bolt://graph:7687");
        assert_eq!(config.target.user, "neo4j");
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_ms, 10);
        assert_eq!(config.signatures.messages, vec!["socket closed"]);
        assert_eq!(config.signatures.codes, TransientSignatures::default().codes);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ImporterConfig::default();
        config.apply_env(|key| match key {
            ENV_URI => Some("bolt://other:7687".to_string()),
            ENV_PASSWORD => Some("secret".to_string()),
            _ => None,
        });
        assert_eq!(config.target.uri, "bolt://other:7687");
        assert_eq!(config.target.user, "neo4j");
        assert_eq!(config.target.password, "secret");
    }

    #[test]
    fn test_fallback_signatures_without_table() {
        let config = ImporterConfig::parse(None, Some(TransientSignatures::bolt())).unwrap();
        assert_eq!(config.signatures, TransientSignatures::bolt());

        let config =
            ImporterConfig::parse(Some("cdc = true"), Some(TransientSignatures::bolt())).unwrap();
        assert!(config.cdc);
        assert_eq!(config.signatures, TransientSignatures::bolt());

        let config = ImporterConfig::parse(Some("cdc = true"), None).unwrap();
        assert_eq!(config.signatures, TransientSignatures::default());
    }

    #[test]
    fn test_signatures_table_beats_fallback() {
        let config = ImporterConfig::parse(
            Some("[signatures]\ncodes = [\"-2019\"]"),
            Some(TransientSignatures::bolt()),
        )
        .unwrap();
        assert_eq!(config.signatures.codes, vec!["-2019"]);
        assert_eq!(config.signatures.messages, TransientSignatures::default().messages);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ImporterConfig::from_toml("cdc = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
