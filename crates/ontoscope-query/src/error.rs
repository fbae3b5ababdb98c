//! Query error types

use thiserror::Error;

/// Result type alias for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Top-level error for the query layer
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Core(#[from] ontoscope_core::Error),

    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Why a completion response could not be turned into a query intent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("response is empty")]
    Empty,

    #[error("no query type found in response")]
    MissingType,

    #[error("unrecognized query type '{0}'")]
    Unrecognized(String),

    #[error("no target given for a {0} query")]
    MissingTarget(String),

    #[error("ambiguous query without a clarification question")]
    MissingClarification,

    #[error("complex query without filters")]
    MissingFilters,
}

/// Failure of the external completion service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion service is not configured: {0}")]
    NotConfigured(String),

    #[error("authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Protocol violations against the exploration session state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a query is already in progress")]
    Busy,

    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("query too long: {len} chars (max {max})")]
    QueryTooLong { len: usize, max: usize },

    #[error("no completion response is expected")]
    NotAwaitingResponse,

    #[error("no clarification is expected")]
    NotAwaitingClarification,

    #[error("invalid session transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl From<ontoscope_core::limits::ValidationError> for SessionError {
    fn from(err: ontoscope_core::limits::ValidationError) -> Self {
        use ontoscope_core::limits::ValidationError;
        match err {
            ValidationError::EmptyQuery => Self::EmptyQuery,
            ValidationError::QueryTooLong { len, max } => Self::QueryTooLong { len, max },
        }
    }
}
