//! Error types for the lotline-db crate.

use thiserror::Error;
use uuid::Uuid;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An optimistic-concurrency write lost to a concurrent writer.
    ///
    /// The campaign was modified between this writer's read and its
    /// write; re-read the document and retry the operation.
    #[error("Version conflict writing campaign {campaign_id} (expected version {expected_version})")]
    VersionConflict {
        campaign_id: Uuid,
        expected_version: i64,
    },

    /// A stored JSONB document failed to decode into its model type.
    #[error("Invalid stored document: {0}")]
    InvalidDocument(String),
}

impl DbError {
    /// Check if this error indicates a lost optimistic-concurrency race.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::VersionConflict { .. })
    }

    /// Check if this error indicates a missing row.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
