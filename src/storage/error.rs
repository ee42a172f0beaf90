//! Error types for the storage layer.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("schema has not been initialized")]
    SchemaMissing,
}

impl StorageError {
    /// Whether retrying after a reconnect could succeed.
    ///
    /// Connectivity and resource failures are transient; anything the
    /// database rejected outright (constraint violations, syntax errors,
    /// oversized values) will fail again no matter how often it is retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(e) => match e {
                sqlx::Error::Io(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::Protocol(_)
                | sqlx::Error::WorkerCrashed => true,
                // SQLSTATE class 08 is connection exceptions, 53 is
                // insufficient resources, 57 is operator intervention
                // (e.g. server shutdown).
                sqlx::Error::Database(db) => db.code().is_some_and(|code| {
                    code.starts_with("08") || code.starts_with("53") || code.starts_with("57")
                }),
                _ => false,
            },
            Self::SchemaMissing => true,
        }
    }
}
