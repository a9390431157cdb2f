//! Vertex import: one batched statement per call.

use relgraph_core::{Record, Vertex};
use tracing::debug;

use super::GraphImporter;
use crate::binder::ParameterBinder;
use crate::connection::ConnectionProvider;
use crate::error::{ImportError, ImportResult};
use crate::events::{ImportEvent, Target};
use crate::projector::project_record;
use crate::query;
use crate::unit::{BatchOutcome, TransactionUnit};

impl<P: ConnectionProvider> GraphImporter<P> {
    pub(super) async fn vertex_attempt(
        &self,
        target: &Target,
        vertex: &Vertex,
        records: &[Option<Record>],
    ) -> ImportResult<usize> {
        vertex.validate()?;

        let Some(stmt) = query::vertex_create(vertex) else {
            self.sink.handle(ImportEvent::RecordFailed {
                record: None,
                error: ImportError::NoSupportedColumn {
                    label: vertex.label.clone(),
                },
            });
            return Ok(0);
        };

        let mut unit =
            TransactionUnit::begin(&self.provider, &self.config.signatures, self.sink.as_ref())
                .await?;

        let attempted = records.iter().flatten().count();
        let mut batch = Vec::with_capacity(attempted);
        let mut target_records = Vec::with_capacity(attempted);
        for record in records.iter().flatten() {
            let target_record = project_record(vertex, record);
            match self.binder.bind(&target_record, &stmt) {
                Ok(bound) => {
                    batch.push(bound);
                    target_records.push(target_record);
                }
                Err(error) => self.sink.handle(ImportEvent::RecordFailed {
                    record: Some(record.clone()),
                    error,
                }),
            }
        }

        let affected = if batch.is_empty() {
            0
        } else {
            match unit.run_batch(target, &batch).await? {
                BatchOutcome::Committed(affected) => affected,
                BatchOutcome::RolledBack(error) => {
                    let records = if self.config.write_error_records {
                        target_records
                    } else {
                        Vec::new()
                    };
                    self.sink.handle(ImportEvent::RolledBack {
                        target: target.clone(),
                        lost: batch.len(),
                        error,
                        records,
                    });
                    return Ok(0);
                }
            }
        };

        debug!(label = %vertex.label, attempted, affected, "Vertex batch done");
        if affected != attempted {
            self.sink.handle(ImportEvent::CountMismatch {
                target: target.clone(),
                attempted,
                affected,
            });
        }
        if affected > 0 {
            self.sink.handle(ImportEvent::Imported {
                target: target.clone(),
                count: affected,
            });
        }
        Ok(affected)
    }
}
