//! In-memory queue source for simple use cases and testing.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::traits::{QueueError, VoteSource};

/// An in-memory queue that mirrors the Redis list semantics: producers push
/// onto the front, the drain pops from the back. Pops hold the lock for the
/// whole removal, so concurrent consumers never receive the same vote.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    votes: Arc<Mutex<VecDeque<String>>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a vote onto the producer end of the queue.
    pub async fn push(&self, vote: impl Into<String>) {
        self.votes.lock().await.push_front(vote.into());
    }

    pub async fn len(&self) -> usize {
        self.votes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.votes.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl VoteSource for MemoryQueue {
    async fn pop(&self) -> Result<Option<String>, QueueError> {
        Ok(self.votes.lock().await.pop_back())
    }

    async fn probe(&self) -> Result<(), QueueError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[tokio::test]
    async fn test_memory_queue_pop_fifo() {
        let queue = MemoryQueue::new();
        queue.push("A").await;
        queue.push("B").await;
        queue.push("C").await;

        assert_eq!(queue.pop().await.unwrap(), Some("A".to_string()));
        assert_eq!(queue.pop().await.unwrap(), Some("B".to_string()));
        assert_eq!(queue.pop().await.unwrap(), Some("C".to_string()));
        assert_eq!(queue.pop().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_queue_pop_empty() {
        let queue = MemoryQueue::new();
        assert_eq!(queue.pop().await.unwrap(), None);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_queue_concurrent_pops_are_disjoint() {
        let queue = MemoryQueue::new();
        for i in 0..100 {
            queue.push(format!("vote-{i}")).await;
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut drained = Vec::new();
                while let Some(vote) = queue.pop().await.unwrap() {
                    drained.push(vote);
                }
                drained
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for vote in handle.await.unwrap() {
                // Each vote is delivered to exactly one consumer.
                assert!(seen.insert(vote));
            }
        }
        assert_eq!(seen.len(), 100);
        assert!(queue.is_empty().await);
    }
}
