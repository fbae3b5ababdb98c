//! Error types for Ontoscope Core

use thiserror::Error;

/// Result type alias using Ontoscope's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Ontoscope core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::limits::ValidationError> for Error {
    fn from(err: crate::limits::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
