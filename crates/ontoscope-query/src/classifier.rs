//! Completion response classifier
//!
//! Turns the raw text returned by the completion service into a
//! [`QueryIntent`]. Two response shapes are accepted:
//!
//! - line-oriented `QUERY_TYPE: ...` / `TARGET: ...`, possibly surrounded by prose
//! - a JSON object with `type`, `target`, `question` and `filters`, possibly
//!   inside a fenced code block
//!
//! JSON is parsed with `serde_json`; when the object is not valid JSON the
//! fields are pulled out one by one with regular expressions.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ClassifyError;
use crate::intent::{Filter, QueryIntent, QueryKind};

const TYPE_PREFIX: &str = "QUERY_TYPE:";
const TARGET_PREFIX: &str = "TARGET:";

// ============================================================================
// Regex Patterns
// ============================================================================

static TYPE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""type"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid regex"));
static TARGET_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""target"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid regex"));
static QUESTION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""question"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid regex")
});
static PROPERTY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""property"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid regex")
});
static VALUE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""value"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid regex"));
static OPERATOR_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""operator"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("Invalid regex")
});
static FILTERS_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"filters"\s*:\s*\[(.*)\]"#).expect("Invalid regex"));
static FILTER_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{[^{}]*\}").expect("Invalid regex"));
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("Invalid regex"));

/// Fields found in a response before validation
#[derive(Debug, Default)]
struct RawFields {
    kind: Option<String>,
    target: Option<String>,
    question: Option<String>,
    filters: Vec<Filter>,
}

/// Parses completion responses into query intents
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryClassifier;

impl QueryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one raw completion response.
    ///
    /// Never panics. Anything that cannot be turned into a usable intent is
    /// a [`ClassifyError`], and fields parsed before the failure are dropped.
    pub fn classify(&self, response: &str) -> Result<QueryIntent, ClassifyError> {
        let text = normalize(response);
        if text.trim().is_empty() {
            return Err(ClassifyError::Empty);
        }

        let intent = match parse_lines(&text).map(validate) {
            Some(Ok(intent)) => {
                tracing::debug!("Parsed line-oriented classification");
                intent
            }
            // Lines that do not validate may sit next to a usable object
            Some(Err(e)) => validate(parse_object(&text)).map_err(|_| e)?,
            None => validate(parse_object(&text))?,
        };
        tracing::debug!(
            "Classified as {} (target '{}', {} filters)",
            intent.kind,
            intent.target,
            intent.filters.len()
        );
        Ok(intent)
    }
}

/// Turn literal `\n` escapes into newlines and unify line endings
fn normalize(response: &str) -> String {
    response.replace("\\n", "\n").replace("\r\n", "\n")
}

fn clean_value(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

fn parse_lines(text: &str) -> Option<RawFields> {
    let mut raw = RawFields::default();
    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix(TYPE_PREFIX) {
            raw.kind = Some(clean_value(value));
        } else if let Some(value) = line.strip_prefix(TARGET_PREFIX) {
            raw.target = Some(clean_value(value));
        }
    }
    (raw.kind.is_some() && raw.target.is_some()).then_some(raw)
}

/// Content of the first fenced code block, or the whole text
fn strip_fences(text: &str) -> &str {
    FENCED_BLOCK
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// The outermost `{...}` span, without surrounding prose
fn object_slice(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

fn parse_object(text: &str) -> RawFields {
    let inner = strip_fences(text);
    let object = object_slice(inner);
    match serde_json::from_str::<Value>(object) {
        Ok(Value::Object(map)) => {
            tracing::debug!("Parsed JSON classification");
            let string = |key: &str| map.get(key).and_then(Value::as_str).map(clean_value);
            RawFields {
                kind: string("type"),
                target: string("target"),
                question: string("question"),
                filters: map
                    .get("filters")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(filter_from_value).collect())
                    .unwrap_or_default(),
            }
        }
        _ => {
            tracing::debug!("Response is not valid JSON, extracting fields individually");
            parse_tolerant(inner)
        }
    }
}

fn filter_from_value(value: &Value) -> Option<Filter> {
    let field = |key: &str| value.get(key).and_then(Value::as_str).map(clean_value);
    let filter = build_filter(field("property"), field("value"), field("operator"));
    if filter.is_none() {
        tracing::debug!("Skipping malformed filter: {}", value);
    }
    filter
}

fn build_filter(
    property: Option<String>,
    value: Option<String>,
    operator: Option<String>,
) -> Option<Filter> {
    let property = property.filter(|p| !p.is_empty())?;
    let value = value.filter(|v| !v.is_empty())?;
    let filter = Filter::new(property, value);
    Some(match operator.filter(|o| !o.is_empty()) {
        Some(operator) => filter.with_operator(operator),
        None => filter,
    })
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| clean_value(&m.as_str().replace("\\\"", "\"")))
}

fn parse_tolerant(text: &str) -> RawFields {
    let filters = FILTERS_ARRAY
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|array| {
            FILTER_OBJECT
                .find_iter(array.as_str())
                .filter_map(|obj| {
                    let obj = obj.as_str();
                    build_filter(
                        capture(&PROPERTY_FIELD, obj),
                        capture(&VALUE_FIELD, obj),
                        capture(&OPERATOR_FIELD, obj),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    RawFields {
        kind: capture(&TYPE_FIELD, text),
        target: capture(&TARGET_FIELD, text),
        question: capture(&QUESTION_FIELD, text),
        filters,
    }
}

fn validate(raw: RawFields) -> Result<QueryIntent, ClassifyError> {
    let token = raw
        .kind
        .filter(|k| !k.is_empty())
        .ok_or(ClassifyError::MissingType)?;
    let kind = QueryKind::from_token(&token).ok_or(ClassifyError::Unrecognized(token))?;
    let target = raw.target.unwrap_or_default();

    match kind {
        QueryKind::Ambiguous => {
            let question = raw
                .question
                .filter(|q| !q.is_empty())
                .ok_or(ClassifyError::MissingClarification)?;
            Ok(QueryIntent {
                target,
                ..QueryIntent::ambiguous(question)
            })
        }
        QueryKind::Complex => {
            if raw.filters.is_empty() {
                return Err(ClassifyError::MissingFilters);
            }
            if target.is_empty() {
                return Err(ClassifyError::MissingTarget(kind.to_string()));
            }
            Ok(QueryIntent::complex(target, raw.filters))
        }
        _ if target.is_empty() && !kind.is_pattern() => {
            Err(ClassifyError::MissingTarget(kind.to_string()))
        }
        _ => Ok(QueryIntent::new(kind, target)),
    }
}
