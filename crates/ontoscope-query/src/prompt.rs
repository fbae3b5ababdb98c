//! Classification prompt

use crate::completion::{CompletionRequest, CLASSIFY_TEMPERATURE};
use ontoscope_core::limits::{MAX_PROMPT_CLASSES, MAX_PROMPT_INDIVIDUALS, MAX_PROMPT_PROPERTIES};
use ontoscope_core::{EntityRef, KnowledgeBase, Result};
use std::fmt::Write;

const INSTRUCTIONS: &str = "\
You are an ontology query analyzer. Parse the user's natural language question \
and identify what they are asking about. You must handle complex queries with \
multiple conditions.

DO NOT answer the question yourself. Just identify the search criteria.
";

const FORMAT: &str = r#"
Respond in ONE of these two formats.

1. Simple queries, exactly two lines:
QUERY_TYPE: [instances|classes|properties|relationships|individual]
TARGET: [search term]

2. JSON, for ambiguous or multi-condition queries:
{"type": "ambiguous", "target": "", "question": "<what you need to know>"}
{"type": "complex", "target": "<class>", "filters": [{"property": "<object property>", "value": "<individual>", "operator": "equals"}]}

Use "ambiguous" only when the question cannot be mapped to the names above.
"#;

fn write_names(prompt: &mut String, heading: &str, names: impl Iterator<Item = EntityRef>) {
    let _ = writeln!(prompt, "\n{}:", heading);
    for entity in names {
        let _ = writeln!(prompt, "  - {}", entity.short_name);
    }
}

/// System prompt listing a bounded sample of the knowledge base's names
pub fn classification_prompt(kb: &dyn KnowledgeBase) -> Result<String> {
    let mut prompt = String::from(INSTRUCTIONS);
    if let Some(title) = kb.title() {
        let _ = writeln!(prompt, "Current Ontology: {}", title);
    }

    write_names(
        &mut prompt,
        "Available Classes",
        kb.all_classes()?
            .into_iter()
            .filter(|c| !c.id.is_builtin_class())
            .take(MAX_PROMPT_CLASSES),
    );
    write_names(
        &mut prompt,
        "Available Object Properties",
        kb.all_object_properties()?.into_iter().take(MAX_PROMPT_PROPERTIES),
    );
    write_names(
        &mut prompt,
        "Available Individuals",
        kb.all_individuals()?.into_iter().take(MAX_PROMPT_INDIVIDUALS),
    );

    prompt.push_str(FORMAT);
    Ok(prompt)
}

/// Full request for classifying `query`
pub fn classification_request(kb: &dyn KnowledgeBase, query: &str) -> Result<CompletionRequest> {
    Ok(CompletionRequest::new(classification_prompt(kb)?, query.trim())
        .with_temperature(CLASSIFY_TEMPERATURE))
}
