//! Import events and sinks.
//!
//! The engine never returns errors from its entry points; outcomes are
//! reported here and the caller's reporting layer decides what to do.

use std::fmt;
use std::sync::Mutex;

use relgraph_core::{Edge, Record, Vertex};
use tracing::{error, info, warn};

use crate::error::ImportError;

/// The definition an event is about.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Vertex(Vertex),
    Edge(Edge),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Vertex(v) => write!(f, "vertex {} ({})", v.label, v.owner),
            Target::Edge(e) => write!(
                f,
                "edge {} ({} -> {})",
                e.label, e.start_label, e.end_label
            ),
        }
    }
}

/// One reported outcome.
#[derive(Debug, Clone)]
pub enum ImportEvent {
    /// Graph elements written and committed.
    Imported { target: Target, count: usize },
    /// A single record (or, with `None`, a whole table) could not be used.
    RecordFailed {
        record: Option<Record>,
        error: ImportError,
    },
    /// A statement failed; the uncommitted work of the unit was rolled back.
    RolledBack {
        target: Target,
        lost: usize,
        error: ImportError,
        /// Target records of the lost work, when error records are kept.
        records: Vec<Record>,
    },
    /// A batch affected a different number of rows than it attempted.
    CountMismatch {
        target: Target,
        attempted: usize,
        affected: usize,
    },
    /// The whole call failed and returned zero.
    ImportFailed {
        target: Target,
        attempted: usize,
        error: ImportError,
    },
}

/// Receives import events.
pub trait EventSink: Send + Sync {
    fn handle(&self, event: ImportEvent);
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn handle(&self, event: ImportEvent) {
        match event {
            ImportEvent::Imported { target, count } => {
                info!(element = %target, count, "Imported graph elements");
            }
            ImportEvent::RecordFailed { record, error } => {
                let columns = record
                    .map(|r| r.column_names().collect::<Vec<_>>().join(","))
                    .unwrap_or_default();
                warn!(columns = %columns, error = %error, "Record skipped");
            }
            ImportEvent::RolledBack {
                target,
                lost,
                error,
                records,
            } => {
                warn!(element = %target, lost, kept = records.len(), error = %error, "Unit rolled back");
            }
            ImportEvent::CountMismatch {
                target,
                attempted,
                affected,
            } => {
                warn!(element = %target, attempted, affected, "Affected row count differs from attempted");
            }
            ImportEvent::ImportFailed {
                target,
                attempted,
                error,
            } => {
                error!(element = %target, attempted, error = %error, "Import failed");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ImportEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ImportEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<ImportEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventSink for CollectingSink {
    fn handle(&self, event: ImportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Forwards each event to every inner sink.
pub struct FanoutSink {
    sinks: Vec<std::sync::Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<std::sync::Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanoutSink {
    fn handle(&self, event: ImportEvent) {
        for sink in &self.sinks {
            sink.handle(event.clone());
        }
    }
}
