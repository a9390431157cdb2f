//! Bounded retry around one import attempt.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{ImportError, ImportResult};
use crate::events::{EventSink, ImportEvent, Target};

/// Fixed-interval retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 2000,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Re-runs an import attempt while it fails transiently.
#[derive(Debug, Clone)]
pub struct RetryController {
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl RetryController {
    pub fn new(policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self { policy, cancel }
    }

    /// Run `attempt` until it succeeds, fails fatally, or runs out of retries.
    ///
    /// A terminal failure is reported once against `target` with the
    /// `attempted` count, and the call yields zero.
    pub async fn run<F, Fut>(
        &self,
        sink: &dyn EventSink,
        target: &Target,
        attempted: usize,
        mut attempt: F,
    ) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ImportResult<usize>>,
    {
        let mut retries = 0;
        loop {
            let err = match attempt().await {
                Ok(count) => return count,
                Err(err) => err,
            };

            let err = if err.is_retryable() && retries < self.policy.max_retries {
                retries += 1;
                warn!(
                    element = %target,
                    retry = retries,
                    max_retries = self.policy.max_retries,
                    error = %err,
                    "Transient failure, retrying"
                );
                match self.backoff().await {
                    Ok(()) => continue,
                    Err(cancelled) => cancelled,
                }
            } else {
                err
            };

            error!(element = %target, attempted, error = %err, "Giving up on import");
            sink.handle(ImportEvent::ImportFailed {
                target: target.clone(),
                attempted,
                error: err,
            });
            return 0;
        }
    }

    /// Sleep the backoff interval unless the run is cancelled first.
    async fn backoff(&self) -> ImportResult<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ImportError::Cancelled),
            _ = tokio::time::sleep(self.policy.backoff()) => Ok(()),
        }
    }
}
