//! Knowledge base accessor trait

use crate::entity::EntityRef;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// An object-property assertion `(subject, property, target)` seen from its subject
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyAssertion {
    pub property: EntityRef,
    pub target: EntityRef,
}

impl PropertyAssertion {
    pub fn new(property: EntityRef, target: EntityRef) -> Self {
        Self { property, target }
    }
}

/// A data-property assertion with a literal value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAssertion {
    pub property: String,
    pub literal: String,
}

impl DataAssertion {
    pub fn new(property: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            literal: literal.into(),
        }
    }
}

/// Read-only access to classes, object properties and individuals.
///
/// Implementations must present a consistent snapshot for the duration of a
/// single view recompute. Any method may fail with
/// [`Error::KnowledgeBase`](crate::Error::KnowledgeBase).
pub trait KnowledgeBase: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Hierarchy
    // ─────────────────────────────────────────────────────────────────────────

    /// Classes whose only named superclass (if any) is `owl:Thing`
    fn root_classes(&self) -> Result<Vec<EntityRef>>;

    /// Direct named subclasses of a class
    fn direct_subclasses(&self, class: &EntityRef) -> Result<Vec<EntityRef>>;

    /// Individuals declared as direct instances of a class
    fn direct_instances(&self, class: &EntityRef) -> Result<Vec<EntityRef>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Individuals
    // ─────────────────────────────────────────────────────────────────────────

    /// Named classes an individual is asserted to be a member of
    fn types_of(&self, individual: &EntityRef) -> Result<Vec<EntityRef>>;

    /// Object-property assertions with the individual as subject
    fn object_property_assertions(&self, individual: &EntityRef)
        -> Result<Vec<PropertyAssertion>>;

    /// Data-property assertions with the individual as subject
    fn data_property_assertions(&self, individual: &EntityRef) -> Result<Vec<DataAssertion>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Signature
    // ─────────────────────────────────────────────────────────────────────────

    fn all_classes(&self) -> Result<Vec<EntityRef>>;

    fn all_object_properties(&self) -> Result<Vec<EntityRef>>;

    fn all_individuals(&self) -> Result<Vec<EntityRef>>;

    /// Human-readable title of the ontology, if it has one
    fn title(&self) -> Option<String> {
        None
    }

    /// Whether an entity would gain children when expanded
    fn has_children(&self, entity: &EntityRef) -> Result<bool> {
        match entity.kind {
            crate::EntityKind::Class => Ok(!self.direct_subclasses(entity)?.is_empty()
                || !self.direct_instances(entity)?.is_empty()),
            crate::EntityKind::Individual => {
                Ok(!self.object_property_assertions(entity)?.is_empty())
            }
            crate::EntityKind::ObjectProperty => Ok(false),
        }
    }
}
