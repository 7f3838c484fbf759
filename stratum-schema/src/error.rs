//! Error types for model production.

use thiserror::Error;

/// Errors raised while producing a relational model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The metadata layer failed to produce a model.
    #[error("Model source error: {0}")]
    Source(String),

    /// The produced model is internally inconsistent.
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl ModelError {
    /// Create a source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create an invalid-model error.
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }
}
