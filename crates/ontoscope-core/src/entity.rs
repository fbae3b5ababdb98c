//! Entity reference types

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// IRI of the universal class
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

/// IRI of the empty class
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";

/// Stable identity of an ontology entity (its IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form of the IRI: the fragment after `#`, otherwise the last path segment
    pub fn short_form(&self) -> &str {
        let iri = self.0.as_str();
        if let Some(idx) = iri.find('#') {
            return &iri[idx + 1..];
        }
        match iri.rfind('/') {
            Some(idx) => &iri[idx + 1..],
            None => iri,
        }
    }

    /// Whether this is `owl:Thing` or `owl:Nothing`
    pub fn is_builtin_class(&self) -> bool {
        self.0 == OWL_THING || self.0 == OWL_NOTHING
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of ontology entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    ObjectProperty,
    Individual,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::ObjectProperty => "object_property",
            Self::Individual => "individual",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a class, object property or individual.
///
/// Equality and hashing use only `id`: two references are equal iff they
/// point at the same ontology entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub short_name: String,
    pub id: EntityId,
}

impl EntityRef {
    /// Create a reference with an explicit label
    pub fn new(kind: EntityKind, short_name: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            short_name: short_name.into(),
            id: id.into(),
        }
    }

    /// Create a reference labelled with the IRI short form
    pub fn from_iri(kind: EntityKind, iri: impl Into<String>) -> Self {
        let id = EntityId::new(iri);
        let short_name = id.short_form().to_string();
        Self { kind, short_name, id }
    }

    pub fn class(iri: impl Into<String>) -> Self {
        Self::from_iri(EntityKind::Class, iri)
    }

    pub fn object_property(iri: impl Into<String>) -> Self {
        Self::from_iri(EntityKind::ObjectProperty, iri)
    }

    pub fn individual(iri: impl Into<String>) -> Self {
        Self::from_iri(EntityKind::Individual, iri)
    }

    pub fn is_class(&self) -> bool {
        self.kind == EntityKind::Class
    }

    pub fn is_individual(&self) -> bool {
        self.kind == EntityKind::Individual
    }

    /// Case-insensitive exact match on the short name
    pub fn name_matches(&self, name: &str) -> bool {
        self.short_name.to_lowercase() == name.to_lowercase()
    }

    /// Case-insensitive substring match on the short name; empty patterns match everything
    pub fn name_contains(&self, pattern: &str) -> bool {
        pattern.is_empty()
            || self
                .short_name
                .to_lowercase()
                .contains(&pattern.to_lowercase())
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name)
    }
}
