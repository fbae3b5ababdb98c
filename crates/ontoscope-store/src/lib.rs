//! Ontoscope Store - Knowledge base implementations
//!
//! This crate provides [`MemoryKnowledgeBase`], an in-memory implementation
//! of [`ontoscope_core::KnowledgeBase`], and the JSON snapshot document it is
//! loaded from and saved to.

pub mod error;
pub mod memory;
pub mod snapshot;

pub use error::{StoreError, StoreResult};
pub use memory::{KnowledgeBaseStats, MemoryKnowledgeBase};
pub use snapshot::{
    ClassRecord, DataRecord, IndividualRecord, KnowledgeBaseDocument, PropertyRecord,
    RelationRecord,
};
