//! The transaction unit shared by every import mode.
//!
//! A unit owns one connection for the duration of an import attempt. Each
//! mode describes its work as a [`UnitPlan`]: which statement an item runs,
//! how the item is bound, and when work is committed. Statement and commit
//! failures are classified: transient ones abort the attempt so the retry
//! controller can act, anything else rolls back the uncommitted work and the
//! unit moves on to the next item.

use relgraph_core::Record;
use tracing::{debug, warn};

use crate::binder::BoundStatement;
use crate::classifier::TransientSignatures;
use crate::connection::{ConnectionGuard, ConnectionProvider, TargetConnection};
use crate::error::{ImportError, ImportResult};
use crate::events::{EventSink, ImportEvent, Target};
use crate::query::Statement;

/// When a unit commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// After every successfully executed item.
    EachItem,
    /// Once, after the last item.
    Once,
}

/// The per-mode half of a transaction unit.
pub trait UnitPlan {
    type Item;

    fn target(&self) -> &Target;

    fn commit_mode(&self) -> CommitMode;

    /// Statement to run for an item; `None` skips the item.
    fn statement(&self, item: &Self::Item) -> Option<&Statement>;

    fn bind(&self, stmt: &Statement, item: &Self::Item) -> ImportResult<BoundStatement>;

    /// Source record behind an item, for error reporting.
    fn record<'i>(&self, _item: &'i Self::Item) -> Option<&'i Record> {
        None
    }
}

/// Result of a batched execution.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Committed; total rows affected.
    Committed(usize),
    /// Failed with a non-transient error and rolled back.
    RolledBack(ImportError),
}

pub struct TransactionUnit<'a, P: ConnectionProvider> {
    conn: ConnectionGuard<'a, P>,
    signatures: &'a TransientSignatures,
    sink: &'a dyn EventSink,
}

impl<'a, P: ConnectionProvider> TransactionUnit<'a, P> {
    /// Acquire a connection in manual-commit mode.
    pub async fn begin(
        provider: &'a P,
        signatures: &'a TransientSignatures,
        sink: &'a dyn EventSink,
    ) -> ImportResult<Self> {
        let conn = ConnectionGuard::acquire(provider).await.map_err(|err| {
            if signatures.is_retryable(&err) {
                ImportError::Transient(err)
            } else {
                ImportError::Connection(err)
            }
        })?;
        Ok(Self {
            conn,
            signatures,
            sink,
        })
    }

    /// Roll back uncommitted work. There is nothing left to undo when the
    /// rollback itself fails, so that is only logged.
    async fn rollback_quietly(&mut self, target: &Target) {
        if let Err(err) = self.conn.rollback().await {
            warn!(element = %target, error = %err, "Rollback failed");
        }
    }

    /// Commit pending work. A transient failure aborts the attempt; any other
    /// failure is rolled back and returned for reporting.
    async fn commit_or_roll_back(&mut self, target: &Target) -> ImportResult<Option<ImportError>> {
        let Err(err) = self.conn.commit().await else {
            return Ok(None);
        };
        let error = self.signatures.classify(err);
        if error.is_retryable() {
            return Err(error);
        }
        warn!(element = %target, error = %error, "Commit failed, rolling back");
        self.rollback_quietly(target).await;
        Ok(Some(error))
    }

    /// Execute the plan over `items`; returns the committed element count.
    pub async fn run<U: UnitPlan>(&mut self, plan: &U, items: &[U::Item]) -> ImportResult<usize> {
        let target = plan.target();
        let mode = plan.commit_mode();
        let mut committed = 0;
        let mut pending = 0;
        let mut pending_items = 0;

        for item in items {
            let Some(stmt) = plan.statement(item) else {
                continue;
            };
            let bound = match plan.bind(stmt, item) {
                Ok(bound) => bound,
                Err(error) => {
                    self.sink.handle(ImportEvent::RecordFailed {
                        record: plan.record(item).cloned(),
                        error,
                    });
                    continue;
                }
            };

            let count = match self.conn.execute(&bound).await {
                Ok(count) => count.max(0) as usize,
                Err(err) => {
                    let error = self.signatures.classify(err);
                    if error.is_retryable() {
                        return Err(error);
                    }
                    warn!(element = %target, error = %error, "Statement failed, rolling back");
                    self.rollback_quietly(target).await;
                    self.sink.handle(ImportEvent::RolledBack {
                        target: target.clone(),
                        lost: pending_items + 1,
                        error,
                        records: plan.record(item).cloned().into_iter().collect(),
                    });
                    pending = 0;
                    pending_items = 0;
                    continue;
                }
            };
            debug!(element = %target, count, statement = %bound.text, "Executed");

            match mode {
                CommitMode::EachItem => match self.commit_or_roll_back(target).await? {
                    None => {
                        committed += count;
                        if count > 0 {
                            self.sink.handle(ImportEvent::Imported {
                                target: target.clone(),
                                count,
                            });
                        }
                    }
                    Some(error) => self.sink.handle(ImportEvent::RolledBack {
                        target: target.clone(),
                        lost: 1,
                        error,
                        records: plan.record(item).cloned().into_iter().collect(),
                    }),
                },
                CommitMode::Once => {
                    pending += count;
                    pending_items += 1;
                }
            }
        }

        if mode == CommitMode::Once && pending_items > 0 {
            match self.commit_or_roll_back(target).await? {
                None => {
                    committed += pending;
                    if committed > 0 {
                        self.sink.handle(ImportEvent::Imported {
                            target: target.clone(),
                            count: committed,
                        });
                    }
                }
                Some(error) => self.sink.handle(ImportEvent::RolledBack {
                    target: target.clone(),
                    lost: pending_items,
                    error,
                    records: Vec::new(),
                }),
            }
        }

        Ok(committed)
    }

    /// Execute a batch as one unit of work and commit it.
    pub async fn run_batch(
        &mut self,
        target: &Target,
        batch: &[BoundStatement],
    ) -> ImportResult<BatchOutcome> {
        let affected = match self.conn.execute_batch(batch).await {
            Ok(affected) => affected,
            Err(err) => {
                let error = self.signatures.classify(err);
                if error.is_retryable() {
                    return Err(error);
                }
                warn!(element = %target, statements = batch.len(), error = %error, "Batch failed, rolling back");
                self.rollback_quietly(target).await;
                return Ok(BatchOutcome::RolledBack(error));
            }
        };

        if let Some(error) = self.commit_or_roll_back(target).await? {
            return Ok(BatchOutcome::RolledBack(error));
        }
        let total = affected.iter().map(|n| (*n).max(0) as usize).sum();
        debug!(element = %target, statements = batch.len(), affected = total, "Batch committed");
        Ok(BatchOutcome::Committed(total))
    }
}
