//! In-memory vote sink for simple use cases and testing.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::error::StorageError;
use super::traits::VoteSink;
use super::types::{VoteCount, VoteRow};

#[derive(Debug, Default)]
struct MemorySinkState {
    schema_ready: bool,
    votes: Vec<String>,
}

/// An in-memory sink that mirrors the PostgreSQL semantics: inserts are
/// rejected until the schema has been initialized, and reads come back in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted votes in insertion order, with 1-based ids.
    pub async fn votes(&self) -> Vec<VoteRow> {
        let state = self.state.lock().await;
        state
            .votes
            .iter()
            .enumerate()
            .map(|(i, vote)| VoteRow {
                id: i as i32 + 1,
                vote: vote.clone(),
            })
            .collect()
    }

    /// Per-value counts, ordered by vote value.
    pub async fn tally(&self) -> Vec<VoteCount> {
        let state = self.state.lock().await;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for vote in &state.votes {
            *counts.entry(vote).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(vote, count)| VoteCount {
                vote: vote.to_string(),
                count,
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.votes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.votes.is_empty()
    }
}

#[async_trait::async_trait]
impl VoteSink for MemorySink {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.state.lock().await.schema_ready = true;
        Ok(())
    }

    async fn insert(&self, vote: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if !state.schema_ready {
            return Err(StorageError::SchemaMissing);
        }
        state.votes.push(vote.to_string());
        Ok(())
    }

    async fn probe(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_requires_schema() {
        let sink = MemorySink::new();
        assert!(matches!(
            sink.insert("A").await,
            Err(StorageError::SchemaMissing)
        ));

        sink.ensure_schema().await.unwrap();
        sink.insert("A").await.unwrap();
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_sink_ensure_schema_is_idempotent() {
        let sink = MemorySink::new();
        sink.ensure_schema().await.unwrap();
        sink.insert("A").await.unwrap();
        // A second initialization must not disturb stored votes.
        sink.ensure_schema().await.unwrap();
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_sink_preserves_insertion_order() {
        let sink = MemorySink::new();
        sink.ensure_schema().await.unwrap();
        for vote in ["C", "A", "B"] {
            sink.insert(vote).await.unwrap();
        }

        let rows = sink.votes().await;
        let values: Vec<&str> = rows.iter().map(|r| r.vote.as_str()).collect();
        assert_eq!(values, ["C", "A", "B"]);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[2].id, 3);
    }

    #[tokio::test]
    async fn test_memory_sink_tally() {
        let sink = MemorySink::new();
        sink.ensure_schema().await.unwrap();
        for vote in ["B", "A", "B"] {
            sink.insert(vote).await.unwrap();
        }

        assert_eq!(
            sink.tally().await,
            [
                VoteCount {
                    vote: "A".to_string(),
                    count: 1
                },
                VoteCount {
                    vote: "B".to_string(),
                    count: 2
                },
            ]
        );
    }
}
