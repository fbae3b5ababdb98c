//! Relationship (edge) types

use crate::entity::EntityRef;
use serde::{Deserialize, Serialize};

/// Kind of a materialized relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "property")]
pub enum RelationKind {
    /// Subclass points at its direct superclass
    SubClassOf,
    /// Instance shown under an expanded class
    InstanceOf,
    /// Individual points at a class it is asserted to belong to
    Type,
    /// Object-property assertion, labelled with the property short name
    ObjectProperty(String),
}

impl RelationKind {
    pub fn label(&self) -> &str {
        match self {
            Self::SubClassOf => "subClassOf",
            Self::InstanceOf => "instanceOf",
            Self::Type => "type",
            Self::ObjectProperty(name) => name,
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A directed, typed edge between two entities.
///
/// Two relationships are equal iff source, target and kind all match, so a
/// set of relationships never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source: EntityRef,
    pub target: EntityRef,
    pub kind: RelationKind,
}

impl Relationship {
    pub fn new(source: EntityRef, target: EntityRef, kind: RelationKind) -> Self {
        Self { source, target, kind }
    }

    pub fn sub_class_of(sub: EntityRef, sup: EntityRef) -> Self {
        Self::new(sub, sup, RelationKind::SubClassOf)
    }

    pub fn instance_of(individual: EntityRef, class: EntityRef) -> Self {
        Self::new(individual, class, RelationKind::InstanceOf)
    }

    pub fn type_of(individual: EntityRef, class: EntityRef) -> Self {
        Self::new(individual, class, RelationKind::Type)
    }

    pub fn object_property(
        subject: EntityRef,
        target: EntityRef,
        property: impl Into<String>,
    ) -> Self {
        Self::new(subject, target, RelationKind::ObjectProperty(property.into()))
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} --{}--> {}", self.source, self.kind, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_relationship_set_semantics() {
        let alice = EntityRef::individual("urn:x#Alice");
        let bob = EntityRef::individual("urn:x#Bob");

        let mut edges = HashSet::new();
        edges.insert(Relationship::object_property(alice.clone(), bob.clone(), "knows"));
        edges.insert(Relationship::object_property(alice.clone(), bob.clone(), "knows"));
        edges.insert(Relationship::object_property(alice.clone(), bob.clone(), "likes"));

        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_kind_distinguishes_edges() {
        let alice = EntityRef::individual("urn:x#Alice");
        let person = EntityRef::class("urn:x#Person");

        let typed = Relationship::type_of(alice.clone(), person.clone());
        let instance = Relationship::instance_of(alice.clone(), person.clone());

        assert_ne!(typed, instance);
        assert_eq!(typed.target, person);
        assert_eq!(instance.to_string(), "Alice --instanceOf--> Person");
    }
}
