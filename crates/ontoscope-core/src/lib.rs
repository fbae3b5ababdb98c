//! Ontoscope Core - Incremental view engine for ontology exploration
//!
//! This crate provides the entity and relationship types, the read-only
//! [`KnowledgeBase`] accessor trait, and [`GraphView`], the partial view a
//! user expands, collapses and highlights while exploring.

pub mod entity;
pub mod error;
pub mod knowledge;
pub mod limits;
pub mod lookup;
pub mod observer;
pub mod relation;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use entity::{EntityId, EntityKind, EntityRef, OWL_NOTHING, OWL_THING};
pub use error::{Error, Result};
pub use knowledge::{DataAssertion, KnowledgeBase, PropertyAssertion};
pub use observer::ViewObserver;
pub use relation::{RelationKind, Relationship};
pub use view::{EdgeView, GraphView, Selection, Toggled, VertexView, ViewSnapshot, ViewState};
