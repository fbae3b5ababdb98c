//! JSON snapshot document for a knowledge base

use crate::error::{StoreError, StoreResult};
use ontoscope_core::entity::{OWL_NOTHING, OWL_THING};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Serialized form of a whole knowledge base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub classes: Vec<ClassRecord>,

    #[serde(default)]
    pub object_properties: Vec<PropertyRecord>,

    #[serde(default)]
    pub individuals: Vec<IndividualRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub iri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subclass_of: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub iri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualRecord {
    pub iri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<RelationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub property: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub property: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declared {
    Class,
    Property,
    Individual,
}

impl Declared {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Property => "object property",
            Self::Individual => "individual",
        }
    }
}

impl KnowledgeBaseDocument {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Read, parse and validate a JSON document from disk
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading knowledge base snapshot from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Check that every IRI is declared once and every reference resolves.
    ///
    /// `owl:Thing` and `owl:Nothing` may be referenced as superclasses or
    /// types without being declared.
    pub fn validate(&self) -> StoreResult<()> {
        let mut declared: HashMap<&str, Declared> = HashMap::new();

        let all = self
            .classes
            .iter()
            .map(|c| (c.iri.as_str(), Declared::Class))
            .chain(
                self.object_properties
                    .iter()
                    .map(|p| (p.iri.as_str(), Declared::Property)),
            )
            .chain(
                self.individuals
                    .iter()
                    .map(|i| (i.iri.as_str(), Declared::Individual)),
            );
        for (iri, kind) in all {
            if let Some(previous) = declared.insert(iri, kind) {
                return Err(StoreError::Conflict(format!(
                    "{} declared as {} and {}",
                    iri,
                    previous.as_str(),
                    kind.as_str()
                )));
            }
        }

        let check = |iri: &str, kind: Declared, referenced_by: &str| -> StoreResult<()> {
            let builtin = kind == Declared::Class && (iri == OWL_THING || iri == OWL_NOTHING);
            if builtin || declared.get(iri) == Some(&kind) {
                return Ok(());
            }
            Err(StoreError::DanglingReference {
                kind: kind.as_str(),
                iri: iri.to_string(),
                referenced_by: referenced_by.to_string(),
            })
        };

        for class in &self.classes {
            for sup in &class.subclass_of {
                check(sup, Declared::Class, &class.iri)?;
            }
        }
        for individual in &self.individuals {
            for class in &individual.types {
                check(class, Declared::Class, &individual.iri)?;
            }
            for relation in &individual.relations {
                check(&relation.property, Declared::Property, &individual.iri)?;
                check(&relation.target, Declared::Individual, &individual.iri)?;
            }
        }
        Ok(())
    }
}
