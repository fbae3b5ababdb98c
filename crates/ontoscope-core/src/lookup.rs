//! Name resolution against the knowledge base

use crate::entity::{EntityKind, EntityRef};
use crate::error::Result;
use crate::knowledge::KnowledgeBase;

/// Order in which entity kinds are searched when a bare name is resolved
pub const RESOLUTION_ORDER: [EntityKind; 3] = [
    EntityKind::Individual,
    EntityKind::Class,
    EntityKind::ObjectProperty,
];

/// All entities of one kind
pub fn entities_of_kind(kb: &dyn KnowledgeBase, kind: EntityKind) -> Result<Vec<EntityRef>> {
    match kind {
        EntityKind::Class => kb.all_classes(),
        EntityKind::ObjectProperty => kb.all_object_properties(),
        EntityKind::Individual => kb.all_individuals(),
    }
}

/// First entity of `kind` whose short name equals `name`, ignoring case
pub fn find_by_name(
    kb: &dyn KnowledgeBase,
    kind: EntityKind,
    name: &str,
) -> Result<Option<EntityRef>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    Ok(entities_of_kind(kb, kind)?
        .into_iter()
        .find(|e| e.name_matches(name)))
}

pub fn find_class(kb: &dyn KnowledgeBase, name: &str) -> Result<Option<EntityRef>> {
    find_by_name(kb, EntityKind::Class, name)
}

pub fn find_individual(kb: &dyn KnowledgeBase, name: &str) -> Result<Option<EntityRef>> {
    find_by_name(kb, EntityKind::Individual, name)
}

/// Resolve a bare name: individuals first, then classes, then object properties
pub fn resolve(kb: &dyn KnowledgeBase, name: &str) -> Result<Option<EntityRef>> {
    for kind in RESOLUTION_ORDER {
        if let Some(found) = find_by_name(kb, kind, name)? {
            tracing::debug!("Resolved '{}' as {}", name, kind);
            return Ok(Some(found));
        }
    }
    tracing::debug!("Could not resolve '{}'", name);
    Ok(None)
}

/// Entities of `kind` whose short name contains `pattern`, ignoring case.
///
/// Built-in `owl:Thing`/`owl:Nothing` are never returned.
pub fn search_by_pattern(
    kb: &dyn KnowledgeBase,
    kind: EntityKind,
    pattern: &str,
) -> Result<Vec<EntityRef>> {
    let pattern = pattern.trim();
    let mut matches: Vec<EntityRef> = entities_of_kind(kb, kind)?
        .into_iter()
        .filter(|e| !e.id.is_builtin_class())
        .filter(|e| e.name_contains(pattern))
        .collect();
    matches.sort_by(|a, b| a.short_name.cmp(&b.short_name));
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureKb;

    #[test]
    fn test_find_by_name_ignores_case() {
        let mut kb = FixtureKb::default();
        let person = kb.class("Person");

        assert_eq!(find_class(&kb, "person").unwrap(), Some(person.clone()));
        assert_eq!(find_class(&kb, "  PERSON ").unwrap(), Some(person));
        assert_eq!(find_class(&kb, "").unwrap(), None);
        assert_eq!(find_individual(&kb, "Person").unwrap(), None);
    }

    #[test]
    fn test_resolve_prefers_individuals() {
        let mut kb = FixtureKb::default();
        kb.class("Rama");
        let rama = kb.individual("Rama");
        let fights = kb.property("fights");

        let found = resolve(&kb, "rama").unwrap().unwrap();
        assert_eq!(found, rama);
        assert!(found.is_individual());

        assert_eq!(resolve(&kb, "Fights").unwrap(), Some(fights));
        assert_eq!(resolve(&kb, "Lanka").unwrap(), None);
    }

    #[test]
    fn test_search_by_pattern_excludes_builtins_and_sorts() {
        let mut kb = FixtureKb::default();
        kb.class_iri(crate::entity::OWL_THING);
        kb.class("Warrior");
        kb.class("Archer");
        kb.class("Sage");

        let found: Vec<String> = search_by_pattern(&kb, EntityKind::Class, "r")
            .unwrap()
            .into_iter()
            .map(|e| e.short_name)
            .collect();
        assert_eq!(found, vec!["Archer", "Warrior"]);

        let all = search_by_pattern(&kb, EntityKind::Class, "").unwrap();
        assert_eq!(all.len(), 3);
    }
}
