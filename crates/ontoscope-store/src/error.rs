//! Store error types

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store-specific error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Dangling reference: {referenced_by} refers to unknown {kind} {iri}")]
    DanglingReference {
        kind: &'static str,
        iri: String,
        referenced_by: String,
    },

    #[error("Conflicting declaration: {0}")]
    Conflict(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<StoreError> for ontoscope_core::Error {
    fn from(err: StoreError) -> Self {
        ontoscope_core::Error::KnowledgeBase(err.to_string())
    }
}
