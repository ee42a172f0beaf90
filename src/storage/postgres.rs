//! PostgreSQL-backed vote sink.

use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::SinkConfig;

use super::error::StorageError;
use super::schema::{self, INSERT_VOTE_SQL};
use super::traits::VoteSink;
use super::types::{VoteCount, VoteRow};

/// Vote sink backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresSink {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSink")
            .field("is_closed", &self.pool.is_closed())
            .finish_non_exhaustive()
    }
}

impl PostgresSink {
    /// Connect to the database described by `config`.
    ///
    /// The pool dials lazily; combine with [`VoteSink::probe`] to verify the
    /// server is actually reachable.
    pub async fn connect(config: &SinkConfig) -> Result<Self, StorageError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    pub fn inner(&self) -> &PgPool {
        &self.pool
    }

    /// All persisted votes in insertion order.
    pub async fn fetch_votes(&self) -> Result<Vec<VoteRow>, StorageError> {
        let rows = sqlx::query_as::<_, VoteRow>("SELECT id, vote FROM votes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Per-value counts over all persisted votes.
    pub async fn tally(&self) -> Result<Vec<VoteCount>, StorageError> {
        let counts = sqlx::query_as::<_, VoteCount>(
            "SELECT vote, COUNT(*) AS count FROM votes GROUP BY vote ORDER BY vote",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Close the pool and all its connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[async_trait::async_trait]
impl VoteSink for PostgresSink {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        schema::init_schema(&self.pool).await
    }

    async fn insert(&self, vote: &str) -> Result<(), StorageError> {
        sqlx::query(INSERT_VOTE_SQL)
            .bind(vote)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> SinkConfig {
        SinkConfig::default().with_host("127.0.0.1")
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL server on 127.0.0.1:5432"]
    async fn test_postgres_sink_schema_and_insert() {
        let sink = PostgresSink::connect(&local_config()).await.unwrap();
        sink.ensure_schema().await.unwrap();
        // Re-running schema creation against an existing table is a no-op.
        sink.ensure_schema().await.unwrap();

        sqlx::query("DELETE FROM votes")
            .execute(sink.inner())
            .await
            .unwrap();

        sink.insert("A").await.unwrap();
        sink.insert("B").await.unwrap();
        sink.insert("A").await.unwrap();

        let rows = sink.fetch_votes().await.unwrap();
        let values: Vec<&str> = rows.iter().map(|r| r.vote.as_str()).collect();
        assert_eq!(values, ["A", "B", "A"]);
        // id is SERIAL, so insertion order and id order agree.
        assert!(rows.windows(2).all(|w| w[0].id < w[1].id));

        let tally = sink.tally().await.unwrap();
        assert_eq!(
            tally,
            [
                VoteCount {
                    vote: "A".to_string(),
                    count: 2
                },
                VoteCount {
                    vote: "B".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL server on 127.0.0.1:5432"]
    async fn test_postgres_sink_probe_and_close() {
        let sink = PostgresSink::connect(&local_config()).await.unwrap();
        sink.probe().await.unwrap();
        assert!(!sink.is_closed());
        sink.close().await;
        assert!(sink.is_closed());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL server on 127.0.0.1:5432"]
    async fn test_postgres_sink_rejects_oversized_vote() {
        let sink = PostgresSink::connect(&local_config()).await.unwrap();
        sink.ensure_schema().await.unwrap();

        // VARCHAR(50) caps vote length; the error is not transient.
        let oversized = "x".repeat(51);
        let err = sink.insert(&oversized).await.unwrap_err();
        assert!(!err.is_transient());
    }
}
