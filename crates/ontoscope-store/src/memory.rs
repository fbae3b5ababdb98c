//! In-memory knowledge base

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{
    ClassRecord, DataRecord, IndividualRecord, KnowledgeBaseDocument, PropertyRecord,
    RelationRecord,
};
use ontoscope_core::{
    DataAssertion, EntityId, EntityKind, EntityRef, KnowledgeBase, PropertyAssertion,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Entity counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct KnowledgeBaseStats {
    pub classes: usize,
    pub object_properties: usize,
    pub individuals: usize,
}

#[derive(Debug, Default, Clone)]
struct Inner {
    title: Option<String>,
    classes: Vec<EntityRef>,
    properties: Vec<EntityRef>,
    individuals: Vec<EntityRef>,
    index: HashMap<EntityId, EntityRef>,
    superclasses: HashMap<EntityId, Vec<EntityRef>>,
    subclasses: HashMap<EntityId, Vec<EntityRef>>,
    types: HashMap<EntityId, Vec<EntityRef>>,
    instances: HashMap<EntityId, Vec<EntityRef>>,
    objects: HashMap<EntityId, Vec<PropertyAssertion>>,
    data: HashMap<EntityId, Vec<DataAssertion>>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl Inner {
    fn declare(&mut self, kind: EntityKind, iri: &str, label: Option<&str>) -> StoreResult<EntityRef> {
        let id = EntityId::new(iri);
        if let Some(existing) = self.index.get(&id) {
            if existing.kind != kind {
                return Err(StoreError::Conflict(format!(
                    "{} already declared as {}, not {}",
                    iri, existing.kind, kind
                )));
            }
            return Ok(existing.clone());
        }

        let entity = match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => EntityRef::new(kind, label, id.clone()),
            None => EntityRef::from_iri(kind, iri),
        };
        match kind {
            EntityKind::Class => self.classes.push(entity.clone()),
            EntityKind::ObjectProperty => self.properties.push(entity.clone()),
            EntityKind::Individual => self.individuals.push(entity.clone()),
        }
        self.index.insert(id, entity.clone());
        Ok(entity)
    }

    fn add_subclass(&mut self, sub: &str, sup: &str) -> StoreResult<()> {
        let sub = self.declare(EntityKind::Class, sub, None)?;
        if EntityId::new(sup).is_builtin_class() {
            return Ok(());
        }
        let sup = self.declare(EntityKind::Class, sup, None)?;
        push_unique(self.superclasses.entry(sub.id.clone()).or_default(), sup.clone());
        push_unique(self.subclasses.entry(sup.id.clone()).or_default(), sub);
        Ok(())
    }

    fn assert_type(&mut self, individual: &str, class: &str) -> StoreResult<()> {
        let individual = self.declare(EntityKind::Individual, individual, None)?;
        if EntityId::new(class).is_builtin_class() {
            return Ok(());
        }
        let class = self.declare(EntityKind::Class, class, None)?;
        push_unique(self.types.entry(individual.id.clone()).or_default(), class.clone());
        push_unique(self.instances.entry(class.id.clone()).or_default(), individual);
        Ok(())
    }

    fn assert_object(&mut self, subject: &str, property: &str, target: &str) -> StoreResult<()> {
        let subject = self.declare(EntityKind::Individual, subject, None)?;
        let property = self.declare(EntityKind::ObjectProperty, property, None)?;
        let target = self.declare(EntityKind::Individual, target, None)?;
        push_unique(
            self.objects.entry(subject.id).or_default(),
            PropertyAssertion::new(property, target),
        );
        Ok(())
    }

    fn assert_data(&mut self, subject: &str, property: &str, value: &str) -> StoreResult<()> {
        let subject = self.declare(EntityKind::Individual, subject, None)?;
        push_unique(
            self.data.entry(subject.id).or_default(),
            DataAssertion::new(property, value),
        );
        Ok(())
    }

    fn from_document(doc: &KnowledgeBaseDocument) -> StoreResult<Self> {
        doc.validate()?;
        let mut inner = Self {
            title: doc.title.clone(),
            ..Self::default()
        };

        for class in &doc.classes {
            inner.declare(EntityKind::Class, &class.iri, class.label.as_deref())?;
        }
        for property in &doc.object_properties {
            inner.declare(EntityKind::ObjectProperty, &property.iri, property.label.as_deref())?;
        }
        for individual in &doc.individuals {
            inner.declare(EntityKind::Individual, &individual.iri, individual.label.as_deref())?;
        }

        for class in &doc.classes {
            for sup in &class.subclass_of {
                inner.add_subclass(&class.iri, sup)?;
            }
        }
        for individual in &doc.individuals {
            for class in &individual.types {
                inner.assert_type(&individual.iri, class)?;
            }
            for relation in &individual.relations {
                inner.assert_object(&individual.iri, &relation.property, &relation.target)?;
            }
            for data in &individual.data {
                inner.assert_data(&individual.iri, &data.property, &data.value)?;
            }
        }
        Ok(inner)
    }

    fn to_document(&self) -> KnowledgeBaseDocument {
        let label = |e: &EntityRef| {
            (e.short_name != e.id.short_form()).then(|| e.short_name.clone())
        };
        let iris = |list: Option<&Vec<EntityRef>>| -> Vec<String> {
            list.map(|l| l.iter().map(|e| e.id.to_string()).collect())
                .unwrap_or_default()
        };

        KnowledgeBaseDocument {
            title: self.title.clone(),
            classes: self
                .classes
                .iter()
                .map(|c| ClassRecord {
                    iri: c.id.to_string(),
                    label: label(c),
                    subclass_of: iris(self.superclasses.get(&c.id)),
                })
                .collect(),
            object_properties: self
                .properties
                .iter()
                .map(|p| PropertyRecord {
                    iri: p.id.to_string(),
                    label: label(p),
                })
                .collect(),
            individuals: self
                .individuals
                .iter()
                .map(|i| IndividualRecord {
                    iri: i.id.to_string(),
                    label: label(i),
                    types: iris(self.types.get(&i.id)),
                    relations: self
                        .objects
                        .get(&i.id)
                        .map(|list| {
                            list.iter()
                                .map(|a| RelationRecord {
                                    property: a.property.id.to_string(),
                                    target: a.target.id.to_string(),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    data: self
                        .data
                        .get(&i.id)
                        .map(|list| {
                            list.iter()
                                .map(|d| DataRecord {
                                    property: d.property.clone(),
                                    value: d.literal.clone(),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// In-memory knowledge base
///
/// Entities are returned in declaration order. Mutation goes through an
/// internal lock, so a shared instance can be edited or reloaded while views
/// built over it are refreshed afterwards.
///
/// Each query takes the lock on its own, so one view recompute issues many
/// independent reads. Edits and [`reload`](Self::reload) must not run while a
/// view is being derived from the same instance. A writer that cannot
/// guarantee that should hand views a [`snapshot`](Self::snapshot) instead.
pub struct MemoryKnowledgeBase {
    inner: RwLock<Inner>,
}

impl MemoryKnowledgeBase {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        let kb = Self::new();
        if let Ok(mut inner) = kb.inner.write() {
            inner.title = Some(title.into());
        }
        kb
    }

    /// Build from a validated document
    pub fn from_document(doc: &KnowledgeBaseDocument) -> StoreResult<Self> {
        let inner = Inner::from_document(doc)?;
        tracing::debug!(
            "Loaded knowledge base: {} classes, {} properties, {} individuals",
            inner.classes.len(),
            inner.properties.len(),
            inner.individuals.len()
        );
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Self::from_document(&KnowledgeBaseDocument::from_json(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_document(&KnowledgeBaseDocument::load(path)?)
    }

    /// Replace the whole content with a new document
    pub fn reload(&self, doc: &KnowledgeBaseDocument) -> StoreResult<()> {
        let fresh = Inner::from_document(doc)?;
        *self.write()? = fresh;
        tracing::info!("Knowledge base reloaded");
        Ok(())
    }

    /// Frozen copy of the current content, taken under a single read lock.
    /// Later edits or reloads of `self` do not reach the copy.
    pub fn snapshot(&self) -> StoreResult<Self> {
        let inner = self.read()?.clone();
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    pub fn to_document(&self) -> StoreResult<KnowledgeBaseDocument> {
        Ok(self.read()?.to_document())
    }

    pub fn stats(&self) -> StoreResult<KnowledgeBaseStats> {
        let inner = self.read()?;
        Ok(KnowledgeBaseStats {
            classes: inner.classes.len(),
            object_properties: inner.properties.len(),
            individuals: inner.individuals.len(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_class(&self, iri: &str) -> StoreResult<EntityRef> {
        self.write()?.declare(EntityKind::Class, iri, None)
    }

    pub fn add_object_property(&self, iri: &str) -> StoreResult<EntityRef> {
        self.write()?.declare(EntityKind::ObjectProperty, iri, None)
    }

    pub fn add_individual(&self, iri: &str) -> StoreResult<EntityRef> {
        self.write()?.declare(EntityKind::Individual, iri, None)
    }

    /// Declare an entity with an explicit display label
    pub fn add_labeled(&self, kind: EntityKind, iri: &str, label: &str) -> StoreResult<EntityRef> {
        self.write()?.declare(kind, iri, Some(label))
    }

    /// Record `sub ⊑ sup`, declaring both classes if needed
    pub fn add_subclass(&self, sub: &str, sup: &str) -> StoreResult<()> {
        self.write()?.add_subclass(sub, sup)
    }

    pub fn assert_type(&self, individual: &str, class: &str) -> StoreResult<()> {
        self.write()?.assert_type(individual, class)
    }

    pub fn assert_object(&self, subject: &str, property: &str, target: &str) -> StoreResult<()> {
        self.write()?.assert_object(subject, property, target)
    }

    pub fn assert_data(&self, subject: &str, property: &str, value: &str) -> StoreResult<()> {
        self.write()?.assert_data(subject, property, value)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }
}

impl Default for MemoryKnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase for MemoryKnowledgeBase {
    fn root_classes(&self) -> ontoscope_core::Result<Vec<EntityRef>> {
        let inner = self.read()?;
        Ok(inner
            .classes
            .iter()
            .filter(|c| !c.id.is_builtin_class())
            .filter(|c| inner.superclasses.get(&c.id).map_or(true, |s| s.is_empty()))
            .cloned()
            .collect())
    }

    fn direct_subclasses(&self, class: &EntityRef) -> ontoscope_core::Result<Vec<EntityRef>> {
        Ok(self.read()?.subclasses.get(&class.id).cloned().unwrap_or_default())
    }

    fn direct_instances(&self, class: &EntityRef) -> ontoscope_core::Result<Vec<EntityRef>> {
        Ok(self.read()?.instances.get(&class.id).cloned().unwrap_or_default())
    }

    fn types_of(&self, individual: &EntityRef) -> ontoscope_core::Result<Vec<EntityRef>> {
        Ok(self.read()?.types.get(&individual.id).cloned().unwrap_or_default())
    }

    fn object_property_assertions(
        &self,
        individual: &EntityRef,
    ) -> ontoscope_core::Result<Vec<PropertyAssertion>> {
        Ok(self.read()?.objects.get(&individual.id).cloned().unwrap_or_default())
    }

    fn data_property_assertions(
        &self,
        individual: &EntityRef,
    ) -> ontoscope_core::Result<Vec<DataAssertion>> {
        Ok(self.read()?.data.get(&individual.id).cloned().unwrap_or_default())
    }

    fn all_classes(&self) -> ontoscope_core::Result<Vec<EntityRef>> {
        Ok(self.read()?.classes.clone())
    }

    fn all_object_properties(&self) -> ontoscope_core::Result<Vec<EntityRef>> {
        Ok(self.read()?.properties.clone())
    }

    fn all_individuals(&self) -> ontoscope_core::Result<Vec<EntityRef>> {
        Ok(self.read()?.individuals.clone())
    }

    fn title(&self) -> Option<String> {
        self.read().ok().and_then(|inner| inner.title.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoscope_core::{GraphView, OWL_THING};

    fn ramayana() -> MemoryKnowledgeBase {
        let kb = MemoryKnowledgeBase::with_title("Ramayana");
        kb.add_subclass("urn:r#Person", OWL_THING).unwrap();
        kb.add_subclass("urn:r#King", "urn:r#Person").unwrap();
        kb.add_subclass("urn:r#Demon", "urn:r#Person").unwrap();
        kb.assert_type("urn:r#Rama", "urn:r#King").unwrap();
        kb.assert_type("urn:r#Ravana", "urn:r#Demon").unwrap();
        kb.assert_type("urn:r#Ravana", "urn:r#King").unwrap();
        kb.assert_object("urn:r#Rama", "urn:r#fights", "urn:r#Ravana").unwrap();
        kb.assert_data("urn:r#Rama", "age", "30").unwrap();
        kb
    }

    #[test]
    fn test_builder_declares_implicitly() {
        let kb = ramayana();
        let stats = kb.stats().unwrap();
        assert_eq!(stats.classes, 3);
        assert_eq!(stats.object_properties, 1);
        assert_eq!(stats.individuals, 2);
        assert_eq!(kb.title().as_deref(), Some("Ramayana"));
    }

    #[test]
    fn test_root_classes_ignore_thing() {
        let kb = ramayana();
        let roots: Vec<String> = kb
            .root_classes()
            .unwrap()
            .into_iter()
            .map(|c| c.short_name)
            .collect();
        assert_eq!(roots, vec!["Person"]);
    }

    #[test]
    fn test_hierarchy_and_assertions() {
        let kb = ramayana();
        let king = EntityRef::class("urn:r#King");
        let ravana = EntityRef::individual("urn:r#Ravana");
        let rama = EntityRef::individual("urn:r#Rama");

        assert_eq!(kb.direct_instances(&king).unwrap().len(), 2);
        assert_eq!(kb.types_of(&ravana).unwrap().len(), 2);

        let objects = kb.object_property_assertions(&rama).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].property.short_name, "fights");
        assert_eq!(objects[0].target, ravana);

        let data = kb.data_property_assertions(&rama).unwrap();
        assert_eq!(data, vec![DataAssertion::new("age", "30")]);
    }

    #[test]
    fn test_duplicate_assertions_collapse() {
        let kb = ramayana();
        kb.assert_type("urn:r#Rama", "urn:r#King").unwrap();
        kb.assert_object("urn:r#Rama", "urn:r#fights", "urn:r#Ravana").unwrap();

        let rama = EntityRef::individual("urn:r#Rama");
        assert_eq!(kb.types_of(&rama).unwrap().len(), 1);
        assert_eq!(kb.object_property_assertions(&rama).unwrap().len(), 1);
    }

    #[test]
    fn test_kind_conflict() {
        let kb = ramayana();
        let err = kb.add_individual("urn:r#King").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_labels_become_short_names() {
        let kb = MemoryKnowledgeBase::new();
        let sage = kb
            .add_labeled(EntityKind::Class, "urn:r#C042", "Sage")
            .unwrap();
        assert_eq!(sage.short_name, "Sage");

        let doc = kb.to_document().unwrap();
        assert_eq!(doc.classes[0].label.as_deref(), Some("Sage"));
    }

    #[test]
    fn test_document_round_trip() {
        let kb = ramayana();
        let doc = kb.to_document().unwrap();
        let rebuilt = MemoryKnowledgeBase::from_document(&doc).unwrap();

        assert_eq!(rebuilt.stats().unwrap(), kb.stats().unwrap());
        assert_eq!(rebuilt.to_document().unwrap(), doc);
    }

    #[test]
    fn test_reload_then_refresh_view() {
        let kb = ramayana();
        let mut view = GraphView::seed(&kb).unwrap();
        assert!(view.find_vertex("King").is_some());

        let doc = KnowledgeBaseDocument::from_json(
            r#"{"classes": [{"iri": "urn:r#Animal"}]}"#,
        )
        .unwrap();
        kb.reload(&doc).unwrap();
        view.refresh(&kb).unwrap();

        assert!(view.find_vertex("King").is_none());
        assert!(view.find_vertex("animal").is_some());
        assert_eq!(kb.title(), None);
    }

    #[test]
    fn test_snapshot_is_isolated_from_reload() {
        let kb = ramayana();
        let frozen = kb.snapshot().unwrap();

        let doc = KnowledgeBaseDocument::from_json(
            r#"{"classes": [{"iri": "urn:r#Animal"}]}"#,
        )
        .unwrap();
        kb.reload(&doc).unwrap();
        kb.add_subclass("urn:r#Tiger", "urn:r#Animal").unwrap();

        assert_eq!(frozen.title().as_deref(), Some("Ramayana"));
        assert_eq!(frozen.stats().unwrap(), ramayana().stats().unwrap());
        let view = GraphView::seed(&frozen).unwrap();
        assert!(view.find_vertex("King").is_some());
        assert!(view.find_vertex("Animal").is_none());

        frozen.add_class("urn:r#Monkey").unwrap();
        assert!(kb.all_classes().unwrap().iter().all(|c| c.short_name != "Monkey"));
    }
}
