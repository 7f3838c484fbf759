//! Error types for the migration engine.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Database operation error.
    #[error("Database error: {0}")]
    Database(String),

    /// Fingerprint store operation error.
    #[error("Fingerprint store error: {0}")]
    Store(String),

    /// The relational model is unusable.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// The drop phase failed; nothing was created.
    #[error("Drop phase failed: {0}")]
    DropPhaseFailed(String),

    /// The create phase failed after the drop phase committed. The schema is
    /// left with objects dropped but not recreated; recovery is the caller's
    /// responsibility.
    #[error("Create phase failed after drop phase committed: {0}")]
    CreatePhaseFailed(String),

    /// General migration error.
    #[error("Migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a fingerprint store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an invalid-model error.
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check whether the failure left the schema in a partially upgraded
    /// state (objects dropped, replacements not created).
    pub fn is_partial_upgrade(&self) -> bool {
        matches!(self, Self::CreatePhaseFailed(_))
    }
}

impl From<stratum_schema::ModelError> for MigrationError {
    fn from(err: stratum_schema::ModelError) -> Self {
        Self::InvalidModel(err.to_string())
    }
}
