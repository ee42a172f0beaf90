//! Configuration module for the tally worker.
//!
//! Provides explicit configuration resolved once at startup and validated
//! before any connection is made:
//! - Queue settings (host, port, list name)
//! - Sink settings (host, port, credentials, database, pool)
//! - Drain settings (polling interval, retry policy)

mod app;
mod validation;

pub use app::{AppConfig, DrainConfig, QueueConfig, RetryConfig, SinkConfig};
pub use validation::{ConfigError, parse_duration};

// Re-export constants
pub use app::{DEFAULT_DRAIN_INTERVAL, DEFAULT_QUEUE_HOST, DEFAULT_SINK_HOST};
