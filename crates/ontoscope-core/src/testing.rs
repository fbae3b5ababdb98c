//! In-memory knowledge base used by unit tests

use crate::entity::EntityRef;
use crate::error::{Error, Result};
use crate::knowledge::{DataAssertion, KnowledgeBase, PropertyAssertion};

const BASE: &str = "urn:test#";

#[derive(Debug, Default)]
pub(crate) struct FixtureKb {
    classes: Vec<EntityRef>,
    properties: Vec<EntityRef>,
    individuals: Vec<EntityRef>,
    subclass_of: Vec<(EntityRef, EntityRef)>,
    instance_of: Vec<(EntityRef, EntityRef)>,
    relations: Vec<(EntityRef, PropertyAssertion)>,
    pub fail: bool,
}

impl FixtureKb {
    pub fn class(&mut self, name: &str) -> EntityRef {
        self.class_iri(&format!("{}{}", BASE, name))
    }

    pub fn class_iri(&mut self, iri: &str) -> EntityRef {
        let class = EntityRef::class(iri);
        self.classes.push(class.clone());
        class
    }

    pub fn property(&mut self, name: &str) -> EntityRef {
        let property = EntityRef::object_property(format!("{}{}", BASE, name));
        if !self.properties.contains(&property) {
            self.properties.push(property.clone());
        }
        property
    }

    pub fn individual(&mut self, name: &str) -> EntityRef {
        let individual = EntityRef::individual(format!("{}{}", BASE, name));
        self.individuals.push(individual.clone());
        individual
    }

    pub fn subclass(&mut self, sub: &EntityRef, sup: &EntityRef) {
        self.subclass_of.push((sub.clone(), sup.clone()));
    }

    pub fn instance(&mut self, individual: &EntityRef, class: &EntityRef) {
        self.instance_of.push((individual.clone(), class.clone()));
    }

    pub fn relate(&mut self, subject: &EntityRef, property: &str, target: &EntityRef) {
        let property = self.property(property);
        self.relations
            .push((subject.clone(), PropertyAssertion::new(property, target.clone())));
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::KnowledgeBase("fixture failure".into()));
        }
        Ok(())
    }
}

impl KnowledgeBase for FixtureKb {
    fn root_classes(&self) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self
            .classes
            .iter()
            .filter(|c| !c.id.is_builtin_class())
            .filter(|c| {
                !self
                    .subclass_of
                    .iter()
                    .any(|(sub, sup)| sub == *c && !sup.id.is_builtin_class())
            })
            .cloned()
            .collect())
    }

    fn direct_subclasses(&self, class: &EntityRef) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self
            .subclass_of
            .iter()
            .filter(|(_, sup)| sup == class)
            .map(|(sub, _)| sub.clone())
            .collect())
    }

    fn direct_instances(&self, class: &EntityRef) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self
            .instance_of
            .iter()
            .filter(|(_, c)| c == class)
            .map(|(i, _)| i.clone())
            .collect())
    }

    fn types_of(&self, individual: &EntityRef) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self
            .instance_of
            .iter()
            .filter(|(i, _)| i == individual)
            .map(|(_, c)| c.clone())
            .collect())
    }

    fn object_property_assertions(
        &self,
        individual: &EntityRef,
    ) -> Result<Vec<PropertyAssertion>> {
        self.check()?;
        Ok(self
            .relations
            .iter()
            .filter(|(s, _)| s == individual)
            .map(|(_, a)| a.clone())
            .collect())
    }

    fn data_property_assertions(&self, _individual: &EntityRef) -> Result<Vec<DataAssertion>> {
        self.check()?;
        Ok(Vec::new())
    }

    fn all_classes(&self) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self.classes.clone())
    }

    fn all_object_properties(&self) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self.properties.clone())
    }

    fn all_individuals(&self) -> Result<Vec<EntityRef>> {
        self.check()?;
        Ok(self.individuals.clone())
    }
}
