//! Drain worker.
//!
//! This module provides:
//! - [`DrainWorker`]: the long-running loop that moves votes from the queue
//!   into storage, one per interval
//! - [`DrainState`]: the worker lifecycle state machine
//! - [`Backoff`]: bounded exponential backoff used while reconnecting

mod backoff;
mod drain;

pub use backoff::Backoff;
pub use drain::{DrainError, DrainState, DrainWorker};
