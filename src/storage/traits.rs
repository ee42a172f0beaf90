//! Core vote sink trait.

use super::error::StorageError;

/// Destination that votes are persisted into.
///
/// The drain worker only talks to storage through this trait, so the
/// production PostgreSQL sink and the in-memory test sink are
/// interchangeable.
#[async_trait::async_trait]
pub trait VoteSink: Send + Sync {
    /// Create the votes table if it does not exist yet. Safe to call
    /// repeatedly.
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Persist a single vote.
    async fn insert(&self, vote: &str) -> Result<(), StorageError>;

    /// Check that the sink is reachable.
    async fn probe(&self) -> Result<(), StorageError>;
}
