//! The drain worker loop and its state machine.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::DrainConfig;
use crate::queue::{QueueError, VoteSource};
use crate::storage::{StorageError, VoteSink};

use super::backoff::Backoff;

/// How often the running worker logs a drained-count summary.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Types
// ============================================================================

/// Lifecycle states of the drain worker.
///
/// The worker starts in `Connecting`, drains in `Running`, drops to
/// `Recovering` on transient faults, and ends in `Stopped` exactly once,
/// whether the stop was clean or fatal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::AsRefStr,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DrainState {
    Connecting,
    Running,
    Recovering,
    Stopped,
}

/// Errors that stop the drain worker.
#[derive(Debug, Error)]
pub enum DrainError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("gave up after {attempts} reconnect attempts")]
    RetriesExhausted { attempts: u16 },
}

impl DrainError {
    /// Whether recovery could clear this error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Queue(e) => e.is_transient(),
            Self::Storage(e) => e.is_transient(),
            Self::RetriesExhausted { .. } => false,
        }
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Moves votes from a queue source into a vote sink, one per drain interval.
///
/// Delivery is at-most-once: a vote popped from the queue is gone even if the
/// following insert fails. Such drops are logged with the vote value.
pub struct DrainWorker<Q, S> {
    queue: Q,
    sink: S,
    config: DrainConfig,
    cancel: CancellationToken,
    state: DrainState,
    processed: u64,
    last_summary: Instant,
}

impl<Q, S> std::fmt::Debug for DrainWorker<Q, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrainWorker")
            .field("state", &self.state)
            .field("processed", &self.processed)
            .finish_non_exhaustive()
    }
}

impl<Q: VoteSource, S: VoteSink> DrainWorker<Q, S> {
    /// Create a worker over an already-constructed source and sink.
    ///
    /// Cancelling `cancel` stops the worker cleanly at the next opportunity,
    /// including mid-backoff.
    pub fn new(queue: Q, sink: S, config: DrainConfig, cancel: CancellationToken) -> Self {
        Self {
            queue,
            sink,
            config,
            cancel,
            state: DrainState::Connecting,
            processed: 0,
            last_summary: Instant::now(),
        }
    }

    pub fn state(&self) -> DrainState {
        self.state
    }

    /// Votes successfully persisted since the worker started.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Run the worker until cancellation or a fatal error.
    ///
    /// Returns `Ok(())` only for a clean cancellation-driven stop. The worker
    /// is in [`DrainState::Stopped`] when this returns, either way.
    pub async fn run(&mut self) -> Result<(), DrainError> {
        let result = self.drive().await;
        self.transition(DrainState::Stopped);
        match &result {
            Ok(()) => info!(processed = self.processed, "Drain worker stopped"),
            Err(e) => error!(error = %e, processed = self.processed, "Drain worker failed"),
        }
        result
    }

    async fn drive(&mut self) -> Result<(), DrainError> {
        // Startup probes are not retried: a worker that cannot reach its
        // dependencies at boot exits so the supervisor can restart it.
        self.queue.probe().await?;
        self.sink.probe().await?;
        self.sink.ensure_schema().await?;
        info!("Connected to queue and sink");
        self.transition(DrainState::Running);
        self.last_summary = Instant::now();

        let mut backoff = Backoff::from_config(&self.config.retry);
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            if self.last_summary.elapsed() >= SUMMARY_INTERVAL {
                info!(processed = self.processed, "Drain summary");
                self.last_summary = Instant::now();
            }

            match self.drain_once().await {
                Ok(()) => {}
                Err(e) if e.is_transient() => {
                    warn!(error = %e, "Transient failure, entering recovery");
                    self.transition(DrainState::Recovering);
                    self.recover(&mut backoff).await?;
                    if self.cancel.is_cancelled() {
                        return Ok(());
                    }
                    self.transition(DrainState::Running);
                    continue;
                }
                Err(e) => return Err(e),
            }

            // One drain attempt per interval, even when the queue was empty.
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    /// Pop at most one vote and persist it.
    async fn drain_once(&mut self) -> Result<(), DrainError> {
        let Some(vote) = self.queue.pop().await? else {
            trace!("Queue empty, nothing to drain");
            return Ok(());
        };

        match self.sink.insert(&vote).await {
            Ok(()) => {
                self.processed += 1;
                info!("Processed vote: {vote}");
                Ok(())
            }
            Err(e) => {
                // The vote was already popped; it will not be retried.
                warn!(vote = %vote, error = %e, "Vote dropped, insert failed after pop");
                Err(e.into())
            }
        }
    }

    /// Wait out backoff delays and re-probe until both endpoints answer.
    ///
    /// Returns `Ok(())` on recovery or cancellation, and an error once the
    /// backoff sequence is exhausted or a probe fails fatally.
    async fn recover(&mut self, backoff: &mut Backoff) -> Result<(), DrainError> {
        loop {
            let Some(delay) = backoff.next_delay() else {
                return Err(DrainError::RetriesExhausted {
                    attempts: backoff.max_attempts(),
                });
            };
            debug!(
                attempt = backoff.attempt(),
                max_attempts = backoff.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                "Waiting before reconnect attempt"
            );
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }

            match self.reconnect().await {
                Ok(()) => {
                    info!(attempts = backoff.attempt(), "Recovered queue and sink");
                    backoff.reset();
                    return Ok(());
                }
                Err(e) if e.is_transient() => {
                    warn!(attempt = backoff.attempt(), error = %e, "Reconnect attempt failed");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn reconnect(&mut self) -> Result<(), DrainError> {
        self.queue.probe().await?;
        self.sink.probe().await?;
        // The outage may have taken the schema with it (e.g. a recreated
        // database), so re-assert it before resuming inserts.
        self.sink.ensure_schema().await?;
        Ok(())
    }

    fn transition(&mut self, next: DrainState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "State transition");
            self.state = next;
        }
    }
}
