//! # Tally
//!
//! A queue drain worker: pops votes off a Redis list and persists them into
//! PostgreSQL, one vote per drain interval.
//!
//! ## Architecture
//!
//! - [`config`]: typed configuration with YAML, environment and CLI layering
//! - [`queue`]: vote sources (Redis list, in-memory)
//! - [`storage`]: vote sinks (PostgreSQL, in-memory) and schema management
//! - [`worker`]: the drain loop, its state machine and reconnect backoff
//!
//! The worker pops from the producer-facing list with `RPOP`, so votes are
//! delivered first-in first-out and each vote reaches exactly one consumer.
//! Delivery into storage is at-most-once: a vote lost between pop and insert
//! is logged and dropped, never re-queued.

pub mod config;
pub mod queue;
pub mod storage;
pub mod worker;

pub use config::AppConfig;
pub use queue::{MemoryQueue, RedisQueue, VoteSource};
pub use storage::{MemorySink, PostgresSink, VoteSink};
pub use worker::{DrainError, DrainState, DrainWorker};
