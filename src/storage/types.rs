//! Row types returned by the storage layer.

use sqlx::FromRow;

/// A persisted vote, in insertion order by `id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VoteRow {
    pub id: i32,
    pub vote: String,
}

/// Aggregated count for one vote value.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VoteCount {
    pub vote: String,
    pub count: i64,
}
