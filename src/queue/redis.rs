//! Redis-backed queue source.
//!
//! Producers `LPUSH` votes onto a list; this source drains it with `RPOP`,
//! so delivery is first-in first-out. `RPOP` removes the element atomically,
//! which keeps concurrent consumers from ever seeing the same vote.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::config::QueueConfig;

use super::traits::{QueueError, VoteSource};

/// Queue source backed by a Redis list.
///
/// Holds an auto-reconnecting managed connection; clones share the same
/// underlying connection.
#[derive(Clone)]
pub struct RedisQueue {
    manager: ConnectionManager,
    list: String,
}

impl std::fmt::Debug for RedisQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueue")
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}

impl RedisQueue {
    /// Connect to the queue service.
    ///
    /// Establishes the connection eagerly, so an unreachable endpoint
    /// surfaces here rather than on the first pop.
    pub async fn connect(config: &QueueConfig) -> Result<Self, QueueError> {
        let url = config.url();
        let client = Client::open(url.as_str())
            .map_err(|e| QueueError::Connection(format!("creating redis client: {e}")))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| QueueError::Connection(format!("connecting to {url}: {e}")))?;

        Ok(Self {
            manager,
            list: config.list.clone(),
        })
    }

    /// Name of the list being drained.
    pub fn list(&self) -> &str {
        &self.list
    }
}

#[async_trait::async_trait]
impl VoteSource for RedisQueue {
    async fn pop(&self) -> Result<Option<String>, QueueError> {
        let mut conn = self.manager.clone();
        let vote: Option<String> = conn.rpop(&self.list, None).await?;
        Ok(vote)
    }

    async fn probe(&self) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
