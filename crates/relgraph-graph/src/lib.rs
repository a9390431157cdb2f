//! # relgraph graph
//!
//! Write side of the relational-to-graph migration: builds Cypher statements
//! for vertices and edges and executes them against the graph target with
//! per-unit commit/rollback and bounded retry on dropped connections.

pub mod binder;
pub mod bolt;
pub mod classifier;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod importer;
pub mod projector;
pub mod query;
pub mod retry;
pub mod unit;

pub use binder::{BoundStatement, OrderedBinder, ParameterBinder};
pub use bolt::{BoltConnection, BoltProvider, GraphConfig};
pub use classifier::TransientSignatures;
pub use config::{ConfigError, ImporterConfig};
pub use connection::{ConnectionGuard, ConnectionProvider, TargetConnection};
pub use error::{DbError, ImportError, ImportResult};
pub use events::{CollectingSink, EventSink, FanoutSink, ImportEvent, Target, TracingSink};
pub use importer::{FkLookup, GraphImporter};
pub use query::Statement;
pub use retry::{RetryController, RetryPolicy};
