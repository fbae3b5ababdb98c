//! Query execution against the knowledge base and the view

use crate::intent::{Filter, QueryIntent, QueryKind};
use crate::suggest;
use chrono::{DateTime, Utc};
use ontoscope_core::{lookup, EntityKind, EntityRef, GraphView, KnowledgeBase, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

/// How a query ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one result
    Found,
    /// Name did not resolve, or nothing matched
    NotFound,
    /// The knowledge base failed while executing
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

/// Human-readable result of one executed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: String,
    pub kind: QueryKind,
    pub target: String,
    pub filter_count: usize,
    pub matches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<EntityRef>,
    pub outcome: Outcome,
    pub body: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl QueryReport {
    pub fn is_found(&self) -> bool {
        self.outcome == Outcome::Found
    }

    /// Full text as shown to the user
    pub fn render(&self) -> String {
        let mut out = String::new();
        let heading = match self.outcome {
            Outcome::Error => "Query Failed",
            _ => "Query Results",
        };
        let _ = writeln!(out, "{}\n", heading);
        let _ = writeln!(out, "Natural Language: {}", self.query);
        let _ = writeln!(out, "Query Type: {}", self.kind);
        let _ = writeln!(out, "Target: {}", self.target);
        if self.filter_count > 0 {
            let _ = writeln!(out, "Filters: {}", self.filter_count);
        }
        let _ = write!(out, "\n{}", self.body);
        out
    }

    /// Write the rendered report to a text file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.render())
    }
}

/// Result of running one intent, before timestamps are attached
struct Execution {
    body: String,
    matches: Vec<String>,
    outcome: Outcome,
    highlighted: Option<EntityRef>,
}

impl Execution {
    fn listing(header: String, items: Vec<String>, empty: &str, noun: &str) -> Self {
        let mut body = format!("{}\n\n", header);
        if items.is_empty() {
            let _ = writeln!(body, "  ({})", empty);
        } else {
            for item in &items {
                let _ = writeln!(body, "  - {}", item);
            }
            let _ = writeln!(body, "\nTotal: {} {}", items.len(), noun);
        }
        Self {
            outcome: if items.is_empty() {
                Outcome::NotFound
            } else {
                Outcome::Found
            },
            body,
            matches: items,
            highlighted: None,
        }
    }

    fn not_found(message: String, suggestions: Vec<String>) -> Self {
        let mut body = format!("{}\n", message);
        if !suggestions.is_empty() {
            let _ = writeln!(body, "Did you mean: {}?", suggestions.join(", "));
        }
        Self {
            body,
            matches: Vec::new(),
            outcome: Outcome::NotFound,
            highlighted: None,
        }
    }
}

fn sorted_names(entities: &[EntityRef]) -> Vec<String> {
    let mut names: Vec<String> = entities.iter().map(|e| e.short_name.clone()).collect();
    names.sort();
    names
}

/// Runs classified intents.
///
/// Execution happens on a scratch copy of the view that replaces the caller's
/// view only when the whole query succeeds.
pub struct QueryExecutor<'a> {
    kb: &'a dyn KnowledgeBase,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(kb: &'a dyn KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Execute `intent` for the question `query`.
    ///
    /// Never fails: knowledge-base errors become an [`Outcome::Error`] report
    /// and leave `view` untouched.
    pub fn execute(&self, query: &str, intent: &QueryIntent, view: &mut GraphView) -> QueryReport {
        let started_at = Utc::now();
        let mut scratch = view.clone();

        let execution = match self.run(intent, &mut scratch) {
            Ok(execution) => {
                *view = scratch;
                execution
            }
            Err(e) => {
                tracing::error!("Query execution failed: {}", e);
                Execution {
                    body: format!("Error: {}\n", e),
                    matches: Vec::new(),
                    outcome: Outcome::Error,
                    highlighted: None,
                }
            }
        };

        tracing::info!(
            "Executed {} query for '{}': {} ({} matches)",
            intent.kind,
            intent.target,
            execution.outcome.as_str(),
            execution.matches.len()
        );

        QueryReport {
            query: query.to_string(),
            kind: intent.kind,
            target: intent.target.clone(),
            filter_count: intent.filters.len(),
            matches: execution.matches,
            highlighted: execution.highlighted,
            outcome: execution.outcome,
            body: execution.body,
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn run(&self, intent: &QueryIntent, view: &mut GraphView) -> Result<Execution> {
        let target = intent.target.trim();
        let mut execution = match intent.kind {
            QueryKind::Instances => self.instances(target)?,
            QueryKind::Classes => self.classes(target)?,
            QueryKind::Properties => self.properties(target)?,
            QueryKind::Relationships => self.relationships(target)?,
            QueryKind::IndividualDetail => self.individual_detail(target)?,
            QueryKind::Complex => return self.complex(target, &intent.filters, view),
            QueryKind::Ambiguous => {
                return Ok(Execution {
                    body: "Cannot execute an ambiguous query without clarification.\n".into(),
                    matches: Vec::new(),
                    outcome: Outcome::Error,
                    highlighted: None,
                })
            }
        };

        execution.highlighted = self.highlight(target, view)?;
        Ok(execution)
    }

    /// Highlight the entity named `name`, searching individuals, classes, then properties
    pub fn highlight(&self, name: &str, view: &mut GraphView) -> Result<Option<EntityRef>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        match lookup::resolve(self.kb, name)? {
            Some(entity) => {
                view.highlight(self.kb, &entity)?;
                Ok(Some(entity))
            }
            None => {
                tracing::warn!("Entity '{}' not found, nothing highlighted", name);
                Ok(None)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query kinds
    // ─────────────────────────────────────────────────────────────────────────

    fn instances(&self, class_name: &str) -> Result<Execution> {
        let Some(class) = lookup::find_class(self.kb, class_name)? else {
            return Ok(Execution::not_found(
                format!("Class not found: {}", class_name),
                suggest::suggest(self.kb, EntityKind::Class, class_name)?,
            ));
        };
        let instances = self.kb.direct_instances(&class)?;
        Ok(Execution::listing(
            format!("Instances of '{}':", class.short_name),
            sorted_names(&instances),
            "No instances found",
            "instance(s)",
        ))
    }

    fn classes(&self, pattern: &str) -> Result<Execution> {
        let classes = lookup::search_by_pattern(self.kb, EntityKind::Class, pattern)?;
        Ok(Execution::listing(
            format!("Classes matching '{}':", pattern),
            sorted_names(&classes),
            "No classes found",
            "class(es)",
        ))
    }

    fn properties(&self, pattern: &str) -> Result<Execution> {
        let properties = lookup::search_by_pattern(self.kb, EntityKind::ObjectProperty, pattern)?;
        Ok(Execution::listing(
            format!("Object properties matching '{}':", pattern),
            sorted_names(&properties),
            "No properties found",
            "propert(y/ies)",
        ))
    }

    fn resolve_individual(&self, name: &str) -> Result<std::result::Result<EntityRef, Execution>> {
        Ok(match lookup::find_individual(self.kb, name)? {
            Some(individual) => Ok(individual),
            None => Err(Execution::not_found(
                format!("Individual not found: {}", name),
                suggest::suggest(self.kb, EntityKind::Individual, name)?,
            )),
        })
    }

    fn relationships(&self, name: &str) -> Result<Execution> {
        let individual = match self.resolve_individual(name)? {
            Ok(individual) => individual,
            Err(missing) => return Ok(missing),
        };

        let mut lines: Vec<String> = self
            .kb
            .object_property_assertions(&individual)?
            .into_iter()
            .map(|a| format!("{} -> {}", a.property.short_name, a.target.short_name))
            .collect();
        lines.sort();

        Ok(Execution::listing(
            format!("Relationships for '{}':", individual.short_name),
            lines,
            "No relationships found",
            "relationship(s)",
        ))
    }

    fn individual_detail(&self, name: &str) -> Result<Execution> {
        let individual = match self.resolve_individual(name)? {
            Ok(individual) => individual,
            Err(missing) => return Ok(missing),
        };

        let types = sorted_names(&self.kb.types_of(&individual)?);
        let mut relations: Vec<String> = self
            .kb
            .object_property_assertions(&individual)?
            .into_iter()
            .map(|a| format!("{} -> {}", a.property.short_name, a.target.short_name))
            .collect();
        relations.sort();
        let data: Vec<String> = self
            .kb
            .data_property_assertions(&individual)?
            .into_iter()
            .map(|d| format!("{} = {}", d.property, d.literal))
            .collect();

        let mut body = format!("Individual: {}\n", individual.short_name);
        let sections = [
            ("Types", &types, "No types found"),
            ("Relationships", &relations, "No relationships found"),
            ("Data Properties", &data, "No data properties found"),
        ];
        for (heading, items, empty) in sections {
            let _ = writeln!(body, "\n{}:", heading);
            if items.is_empty() {
                let _ = writeln!(body, "  ({})", empty);
            }
            for item in items {
                let _ = writeln!(body, "  - {}", item);
            }
        }

        Ok(Execution {
            body,
            matches: vec![individual.short_name.clone()],
            outcome: Outcome::Found,
            highlighted: None,
        })
    }

    /// Direct instances of `class_name` satisfying every filter.
    ///
    /// A filter holds when one object-property assertion has a matching
    /// property name and a matching target name, both ignoring case.
    fn complex(
        &self,
        class_name: &str,
        filters: &[Filter],
        view: &mut GraphView,
    ) -> Result<Execution> {
        let Some(class) = lookup::find_class(self.kb, class_name)? else {
            return Ok(Execution::not_found(
                format!("Class not found: {}", class_name),
                suggest::suggest(self.kb, EntityKind::Class, class_name)?,
            ));
        };

        for filter in filters.iter().filter(|f| !f.operator.eq_ignore_ascii_case("equals")) {
            tracing::debug!(
                "Operator '{}' on {} compared as equals",
                filter.operator,
                filter.property
            );
        }

        let mut candidates = self.kb.direct_instances(&class)?;
        candidates.sort_by(|a, b| a.short_name.cmp(&b.short_name));

        let mut survivors = Vec::new();
        for individual in candidates {
            let assertions = self.kb.object_property_assertions(&individual)?;
            let matches_all = filters.iter().all(|filter| {
                assertions.iter().any(|a| {
                    a.property.name_matches(&filter.property) && a.target.name_matches(&filter.value)
                })
            });
            if matches_all {
                survivors.push(individual);
            }
        }

        for individual in &survivors {
            view.pin(individual);
            view.highlight(self.kb, individual)?;
        }
        let highlighted = match survivors.last() {
            Some(last) => Some(last.clone()),
            None => {
                view.highlight(self.kb, &class)?;
                Some(class.clone())
            }
        };

        let names: Vec<String> = survivors.iter().map(|s| s.short_name.clone()).collect();
        let mut execution = Execution::listing(
            format!(
                "Complex query results for '{}' ({} filter(s)):",
                class.short_name,
                filters.len()
            ),
            names,
            "No matching instances found",
            "match(es)",
        );
        execution.highlighted = highlighted;
        Ok(execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoscope_core::{DataAssertion, PropertyAssertion, OWL_THING};
    use ontoscope_store::MemoryKnowledgeBase;

    fn ramayana() -> MemoryKnowledgeBase {
        let kb = MemoryKnowledgeBase::with_title("Ramayana");
        kb.add_subclass("urn:r#Person", OWL_THING).unwrap();
        kb.add_subclass("urn:r#Warrior", "urn:r#Person").unwrap();
        kb.add_subclass("urn:r#Demon", "urn:r#Person").unwrap();
        kb.add_class("urn:r#Kingdom").unwrap();

        kb.assert_type("urn:r#Rama", "urn:r#Warrior").unwrap();
        kb.assert_type("urn:r#Lakshmana", "urn:r#Warrior").unwrap();
        kb.assert_type("urn:r#Ravana", "urn:r#Demon").unwrap();
        kb.assert_type("urn:r#Kumbhakarna", "urn:r#Demon").unwrap();
        kb.assert_type("urn:r#Sugriva", "urn:r#Person").unwrap();
        kb.assert_type("urn:r#Lanka", "urn:r#Kingdom").unwrap();

        kb.assert_object("urn:r#Rama", "urn:r#fights", "urn:r#Ravana").unwrap();
        kb.assert_object("urn:r#Rama", "urn:r#fights", "urn:r#Kumbhakarna").unwrap();
        kb.assert_object("urn:r#Rama", "urn:r#allyOf", "urn:r#Sugriva").unwrap();
        kb.assert_object("urn:r#Lakshmana", "urn:r#fights", "urn:r#Ravana").unwrap();
        kb.assert_object("urn:r#Ravana", "urn:r#rules", "urn:r#Lanka").unwrap();
        kb.assert_data("urn:r#Rama", "age", "32").unwrap();
        kb
    }

    fn run(kb: &dyn KnowledgeBase, intent: QueryIntent, view: &mut GraphView) -> QueryReport {
        QueryExecutor::new(kb).execute("test question", &intent, view)
    }

    #[test]
    fn test_instances_case_insensitive() {
        let kb = ramayana();
        let mut view = GraphView::new();
        let report = run(&kb, QueryIntent::new(QueryKind::Instances, "warrior"), &mut view);

        assert_eq!(report.outcome, Outcome::Found);
        assert_eq!(report.matches, vec!["Lakshmana", "Rama"]);
        assert!(report.body.contains("Instances of 'Warrior':"));
        assert!(report.body.contains("  - Rama\n"));
        assert!(report.body.contains("Total: 2 instance(s)"));

        let highlighted = report.highlighted.unwrap();
        assert!(highlighted.is_class());
        assert_eq!(view.selected(), Some(&highlighted));
        assert!(view.find_vertex("Rama").is_some());
    }

    #[test]
    fn test_instances_are_direct_only() {
        let kb = ramayana();
        let mut view = GraphView::new();
        let report = run(&kb, QueryIntent::new(QueryKind::Instances, "Person"), &mut view);
        assert_eq!(report.matches, vec!["Sugriva"]);
    }

    #[cfg(feature = "fuzzy")]
    #[test]
    fn test_unknown_class_suggests() {
        let kb = ramayana();
        let mut view = GraphView::new();
        let report = run(&kb, QueryIntent::new(QueryKind::Instances, "Warior"), &mut view);

        assert_eq!(report.outcome, Outcome::NotFound);
        assert!(report.body.contains("Class not found: Warior"));
        assert!(report.body.contains("Did you mean: Warrior?"));
        assert!(report.highlighted.is_none());
        assert!(view.vertices().is_empty());
    }

    #[test]
    fn test_classes_and_properties_patterns() {
        let kb = ramayana();
        let mut view = GraphView::new();

        let report = run(&kb, QueryIntent::new(QueryKind::Classes, ""), &mut view);
        assert_eq!(report.matches, vec!["Demon", "Kingdom", "Person", "Warrior"]);
        assert!(report.body.contains("Total: 4 class(es)"));
        assert!(report.highlighted.is_none());

        let report = run(&kb, QueryIntent::new(QueryKind::Properties, "F"), &mut view);
        assert_eq!(report.matches, vec!["allyOf", "fights"]);

        let report = run(&kb, QueryIntent::new(QueryKind::Properties, "zzz"), &mut view);
        assert_eq!(report.outcome, Outcome::NotFound);
        assert!(report.body.contains("(No properties found)"));
    }

    #[test]
    fn test_relationships_and_highlight() {
        let kb = ramayana();
        let mut view = GraphView::seed(&kb).unwrap();
        let report = run(&kb, QueryIntent::new(QueryKind::Relationships, "RAMA"), &mut view);

        assert_eq!(
            report.matches,
            vec!["allyOf -> Sugriva", "fights -> Kumbhakarna", "fights -> Ravana"]
        );
        assert!(report.body.contains("Total: 3 relationship(s)"));
        assert_eq!(view.selected().map(|e| e.short_name.as_str()), Some("Rama"));
    }

    #[test]
    fn test_individual_detail() {
        let kb = ramayana();
        let mut view = GraphView::new();

        let report = run(&kb, QueryIntent::new(QueryKind::IndividualDetail, "rama"), &mut view);
        assert_eq!(report.outcome, Outcome::Found);
        assert!(report.body.contains("Types:\n  - Warrior\n"));
        assert!(report.body.contains("  - fights -> Ravana\n"));
        assert!(report.body.contains("  - age = 32\n"));

        let report = run(&kb, QueryIntent::new(QueryKind::IndividualDetail, "Lanka"), &mut view);
        assert!(report.body.contains("(No relationships found)"));
        assert!(report.body.contains("(No data properties found)"));
    }

    #[test]
    fn test_missing_individual_is_not_an_error() {
        let kb = ramayana();
        let mut view = GraphView::new();
        let report = run(&kb, QueryIntent::new(QueryKind::Relationships, "Hanuman"), &mut view);

        assert_eq!(report.outcome, Outcome::NotFound);
        assert!(report.body.contains("Individual not found: Hanuman"));
        assert!(report.highlighted.is_none());
        assert!(view.selected().is_none());
    }

    #[test]
    fn test_complex_filters_use_and_semantics() {
        let kb = ramayana();
        let mut view = GraphView::new();

        let both = QueryIntent::complex(
            "Warrior",
            vec![
                Filter::new("fights", "Ravana"),
                Filter::new("FIGHTS", "kumbhakarna"),
            ],
        );
        let report = run(&kb, both, &mut view);
        assert_eq!(report.matches, vec!["Rama"]);
        assert_eq!(report.filter_count, 2);
        assert!(report.body.contains("Total: 1 match(es)"));
        assert_eq!(view.selected().map(|e| e.short_name.as_str()), Some("Rama"));
        assert_eq!(view.pinned().len(), 1);
    }

    #[test]
    fn test_complex_pins_every_survivor() {
        let kb = ramayana();
        let mut view = GraphView::new();

        let report = run(
            &kb,
            QueryIntent::complex("warrior", vec![Filter::new("fights", "Ravana")]),
            &mut view,
        );
        assert_eq!(report.matches, vec!["Lakshmana", "Rama"]);
        assert_eq!(view.pinned().len(), 2);
        assert!(view.find_vertex("Lakshmana").is_some());
        assert_eq!(report.highlighted.map(|e| e.short_name), Some("Rama".to_string()));
    }

    #[test]
    fn test_complex_without_survivors_highlights_class() {
        let kb = ramayana();
        let mut view = GraphView::new();

        let report = run(
            &kb,
            QueryIntent::complex("Warrior", vec![Filter::new("fights", "Hanuman")]),
            &mut view,
        );
        assert_eq!(report.outcome, Outcome::NotFound);
        assert!(report.body.contains("(No matching instances found)"));
        assert_eq!(view.selected().map(|e| e.short_name.as_str()), Some("Warrior"));
        assert!(view.pinned().is_empty());
    }

    /// Delegates to a real knowledge base but cannot list subclasses
    struct BrokenHierarchy(MemoryKnowledgeBase);

    impl KnowledgeBase for BrokenHierarchy {
        fn root_classes(&self) -> Result<Vec<EntityRef>> {
            self.0.root_classes()
        }
        fn direct_subclasses(&self, _class: &EntityRef) -> Result<Vec<EntityRef>> {
            Err(ontoscope_core::Error::KnowledgeBase("hierarchy unavailable".into()))
        }
        fn direct_instances(&self, class: &EntityRef) -> Result<Vec<EntityRef>> {
            self.0.direct_instances(class)
        }
        fn types_of(&self, individual: &EntityRef) -> Result<Vec<EntityRef>> {
            self.0.types_of(individual)
        }
        fn object_property_assertions(
            &self,
            individual: &EntityRef,
        ) -> Result<Vec<PropertyAssertion>> {
            self.0.object_property_assertions(individual)
        }
        fn data_property_assertions(&self, individual: &EntityRef) -> Result<Vec<DataAssertion>> {
            self.0.data_property_assertions(individual)
        }
        fn all_classes(&self) -> Result<Vec<EntityRef>> {
            self.0.all_classes()
        }
        fn all_object_properties(&self) -> Result<Vec<EntityRef>> {
            self.0.all_object_properties()
        }
        fn all_individuals(&self) -> Result<Vec<EntityRef>> {
            self.0.all_individuals()
        }
    }

    #[test]
    fn test_failure_leaves_view_untouched() {
        let kb = BrokenHierarchy(ramayana());
        let mut view = GraphView::new();
        let report = run(&kb, QueryIntent::new(QueryKind::Instances, "Warrior"), &mut view);

        assert_eq!(report.outcome, Outcome::Error);
        assert!(report.body.contains("hierarchy unavailable"));
        assert!(view.vertices().is_empty());
        assert!(view.selected().is_none());
    }

    #[test]
    fn test_render_and_save() {
        let kb = ramayana();
        let mut view = GraphView::new();
        let report = run(
            &kb,
            QueryIntent::complex("Warrior", vec![Filter::new("fights", "Ravana")]),
            &mut view,
        );

        let text = report.render();
        assert!(text.starts_with("Query Results\n"));
        assert!(text.contains("Natural Language: test question"));
        assert!(text.contains("Query Type: complex"));
        assert!(text.contains("Filters: 1"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        report.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }
}
