//! Vote persistence layer.
//!
//! This module provides:
//! - [`VoteSink`]: the trait the drain worker writes through
//! - [`PostgresSink`]: PostgreSQL-backed sink used in production
//! - [`MemorySink`]: in-memory sink for simple use cases and testing
//! - Schema management for the `votes` table

mod error;
mod memory;
mod postgres;
mod schema;
mod traits;
mod types;

pub use error::StorageError;
pub use memory::MemorySink;
pub use postgres::PostgresSink;
pub use schema::{INSERT_VOTE_SQL, VOTES_TABLE_DDL, init_schema};
pub use traits::VoteSink;
pub use types::{VoteCount, VoteRow};
