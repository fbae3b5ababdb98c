//! Size limits for prompts, queries and explanations

/// Maximum class names listed in the classification prompt (30)
pub const MAX_PROMPT_CLASSES: usize = 30;

/// Maximum object property names listed in the classification prompt (20)
pub const MAX_PROMPT_PROPERTIES: usize = 20;

/// Maximum individual names listed in the classification prompt (20)
pub const MAX_PROMPT_INDIVIDUALS: usize = 20;

/// Maximum length of a free-text question (4000 chars)
pub const MAX_QUERY_LEN: usize = 4000;

/// Maximum characters of ontology outline sent for explanation (15000)
pub const MAX_EXPLAIN_CHARS: usize = 15_000;

/// Maximum "did you mean" suggestions in a not-found report (3)
pub const MAX_SUGGESTIONS: usize = 3;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyQuery,
    QueryTooLong { len: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "Query cannot be empty"),
            Self::QueryTooLong { len, max } => {
                write!(f, "Query too long: {} chars (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a free-text question before it is classified
pub fn validate_query(query: &str) -> Result<(), ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    let len = trimmed.chars().count();
    if len > MAX_QUERY_LEN {
        return Err(ValidationError::QueryTooLong {
            len,
            max: MAX_QUERY_LEN,
        });
    }
    Ok(())
}

/// Cut `text` to at most `max` characters, appending a marker when cut
pub fn truncate_with_marker(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\n\n... (truncated for length)", &text[..idx]),
        None => text.to_string(),
    }
}
