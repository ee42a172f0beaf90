//! Core queue source trait and error types.

use thiserror::Error;

/// Errors that can occur while popping from the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Redis command or protocol error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Failed to establish a connection to the queue service.
    #[error("queue connection error: {0}")]
    Connection(String),
}

impl QueueError {
    /// Whether a retry against the same endpoint may succeed.
    ///
    /// Connection drops, I/O failures, and timeouts are transient; protocol
    /// misuse and authentication failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Redis(e) => !e.is_unrecoverable_error(),
            Self::Connection(_) => true,
        }
    }
}

/// A shared FIFO supplying votes to drain.
///
/// Producers append at one end; [`pop`](VoteSource::pop) removes from the
/// other, so items come out in the order they went in. A pop must be atomic
/// across concurrent consumers: each item is delivered to exactly one caller,
/// which is what makes running several workers against the same queue safe.
#[async_trait::async_trait]
pub trait VoteSource: Send + Sync {
    /// Pop one vote without blocking.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    async fn pop(&self) -> Result<Option<String>, QueueError>;

    /// Check that the queue service is reachable.
    async fn probe(&self) -> Result<(), QueueError>;
}
