//! Database schema management for vote persistence.

use sqlx::PgPool;

use super::error::StorageError;

/// DDL for the votes table.
///
/// `IF NOT EXISTS` makes initialization idempotent: re-running it against an
/// existing table is a no-op and never touches stored rows.
pub const VOTES_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS votes (
    id SERIAL PRIMARY KEY,
    vote VARCHAR(50)
)
"#;

/// Parameterized insert for a single vote.
pub const INSERT_VOTE_SQL: &str = "INSERT INTO votes (vote) VALUES ($1)";

/// Initialize the database schema.
pub async fn init_schema(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query(VOTES_TABLE_DDL).execute(pool).await?;
    tracing::info!("Database schema initialized");
    Ok(())
}
