//! Structured query intents

use serde::{Deserialize, Serialize};

/// What a classified question asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Instances,
    Classes,
    Properties,
    Relationships,
    IndividualDetail,
    Complex,
    Ambiguous,
}

impl QueryKind {
    /// Map a type token from a completion response, ignoring case.
    ///
    /// Plural and singular spellings are both accepted.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().trim_matches(|c| c == '[' || c == ']').to_lowercase();
        match token.as_str() {
            "instances" | "instance" => Some(Self::Instances),
            "classes" | "class" => Some(Self::Classes),
            "properties" | "property" => Some(Self::Properties),
            "relationships" | "relationship" => Some(Self::Relationships),
            "individual" | "entity" | "individual_detail" | "individualdetail" => {
                Some(Self::IndividualDetail)
            }
            "complex" => Some(Self::Complex),
            "ambiguous" => Some(Self::Ambiguous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instances => "instances",
            Self::Classes => "classes",
            Self::Properties => "properties",
            Self::Relationships => "relationships",
            Self::IndividualDetail => "individual",
            Self::Complex => "complex",
            Self::Ambiguous => "ambiguous",
        }
    }

    /// Whether the target is a substring pattern that may be empty
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Classes | Self::Properties)
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(property, value)` condition of a complex query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub property: String,
    pub value: String,
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    "equals".to_string()
}

impl Filter {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            operator: default_operator(),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }
}

/// Classified form of a free-text question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub kind: QueryKind,
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
}

impl QueryIntent {
    pub fn new(kind: QueryKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            filters: Vec::new(),
            clarification_question: None,
        }
    }

    pub fn complex(class: impl Into<String>, filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Self::new(QueryKind::Complex, class)
        }
    }

    pub fn ambiguous(question: impl Into<String>) -> Self {
        Self {
            clarification_question: Some(question.into()),
            ..Self::new(QueryKind::Ambiguous, "")
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.kind == QueryKind::Ambiguous
    }
}
