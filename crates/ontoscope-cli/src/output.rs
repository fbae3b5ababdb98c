//! Output formatting utilities

use ontoscope_core::{EntityKind, ViewSnapshot};
use ontoscope_query::{QueryIntent, QueryReport};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Pretty JSON, or `{}` if the value cannot be serialized
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

fn kind_tag(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Class => "C",
        EntityKind::ObjectProperty => "P",
        EntityKind::Individual => "I",
    }
}

/// One line per vertex and edge
pub fn format_view(snapshot: &ViewSnapshot, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(snapshot);
    }

    let mut out = format!("Vertices ({}):\n", snapshot.vertices.len());
    for vertex in &snapshot.vertices {
        let mut flags = Vec::new();
        if vertex.expanded {
            flags.push("expanded");
        } else if vertex.expandable {
            flags.push("+");
        }
        if vertex.pinned {
            flags.push("pinned");
        }
        if vertex.selected {
            flags.push("selected");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        out.push_str(&format!("  ({}) {}{}\n", kind_tag(vertex.kind), vertex.name, flags));
    }

    out.push_str(&format!("Edges ({}):\n", snapshot.edges.len()));
    for edge in &snapshot.edges {
        out.push_str(&format!("  {} -{}-> {}\n", edge.source, edge.label, edge.target));
    }
    out
}

/// Short one-line description of a view
pub fn summarize_view(snapshot: &ViewSnapshot) -> String {
    let selected = snapshot
        .selected
        .as_deref()
        .map(|s| format!(", selected: {}", s))
        .unwrap_or_default();
    format!(
        "View: {} vertices, {} edges{}",
        snapshot.vertices.len(),
        snapshot.edges.len(),
        selected
    )
}

pub fn format_report(report: &QueryReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Table => report.render(),
    }
}

pub fn format_intent(intent: &QueryIntent, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(intent);
    }

    let mut out = format!("Type: {}\n", intent.kind);
    if !intent.target.is_empty() {
        out.push_str(&format!("Target: {}\n", intent.target));
    }
    if let Some(question) = &intent.clarification_question {
        out.push_str(&format!("Question: {}\n", question));
    }
    for filter in &intent.filters {
        out.push_str(&format!(
            "Filter: {} {} {}\n",
            filter.property, filter.operator, filter.value
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoscope_core::GraphView;
    use ontoscope_query::{Filter, QueryKind};
    use ontoscope_store::MemoryKnowledgeBase;

    #[test]
    fn test_format_view_table() {
        let kb = MemoryKnowledgeBase::new();
        kb.add_subclass("urn:r#Warrior", "urn:r#Person").unwrap();
        kb.assert_type("urn:r#Rama", "urn:r#Warrior").unwrap();
        let view = GraphView::seed(&kb).unwrap();
        let snapshot = view.snapshot(&kb).unwrap();

        let text = format_view(&snapshot, OutputFormat::Table);
        assert!(text.starts_with("Vertices (2):\n"));
        assert!(text.contains("  (C) Person [expanded]\n"));
        assert!(text.contains("  (C) Warrior [+]\n"));
        assert!(text.contains("  Warrior -subClassOf-> Person\n"));
        assert_eq!(summarize_view(&snapshot), "View: 2 vertices, 1 edges");
    }

    #[test]
    fn test_format_intent() {
        let intent = QueryIntent::complex(
            "Person",
            vec![Filter::new("fights", "Ravana"), Filter::new("rules", "Ayodhya")],
        );
        assert_eq!(intent.kind, QueryKind::Complex);
        let text = format_intent(&intent, OutputFormat::Table);
        assert!(text.contains("Type: complex\n"));
        assert!(text.contains("Target: Person\n"));
        assert!(text.contains("Filter: rules equals Ayodhya\n"));

        let json = format_intent(&intent, OutputFormat::Json);
        assert!(json.contains("\"filters\""));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Table);
    }
}
