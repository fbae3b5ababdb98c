//! Natural-language explanation of a whole knowledge base

use crate::completion::{CompletionRequest, CompletionService, EXPLAIN_TEMPERATURE};
use crate::error::QueryResult;
use ontoscope_core::limits::{truncate_with_marker, MAX_EXPLAIN_CHARS};
use ontoscope_core::{KnowledgeBase, Result};
use std::fmt::Write;

const SYSTEM_PROMPT: &str = "\
You are an expert in ontology analysis and OWL (Web Ontology Language). \
Analyze the provided ontology and create a clear, concise explanation. \
Format your response as bullet points describing:
- The main purpose/domain of this ontology
- Key classes and their relationships
- Important properties
- Notable individuals (if any)
- Overall structure and organization

Keep it clear and accessible, avoiding overly technical jargon where possible.";

/// Plain-text outline of every class, property and individual
pub fn outline(kb: &dyn KnowledgeBase) -> Result<String> {
    let mut out = String::new();
    if let Some(title) = kb.title() {
        let _ = writeln!(out, "Ontology: {}\n", title);
    }

    let _ = writeln!(out, "Classes:");
    for class in kb.all_classes()? {
        if class.id.is_builtin_class() {
            continue;
        }
        let subclasses = kb.direct_subclasses(&class)?;
        if subclasses.is_empty() {
            let _ = writeln!(out, "  {}", class.short_name);
        } else {
            let names: Vec<&str> = subclasses.iter().map(|s| s.short_name.as_str()).collect();
            let _ = writeln!(out, "  {} (subclasses: {})", class.short_name, names.join(", "));
        }
    }

    let _ = writeln!(out, "\nObject Properties:");
    for property in kb.all_object_properties()? {
        let _ = writeln!(out, "  {}", property.short_name);
    }

    let _ = writeln!(out, "\nIndividuals:");
    for individual in kb.all_individuals()? {
        let types: Vec<String> = kb
            .types_of(&individual)?
            .into_iter()
            .map(|t| t.short_name)
            .collect();
        let _ = writeln!(out, "  {} : {}", individual.short_name, types.join(", "));
        for assertion in kb.object_property_assertions(&individual)? {
            let _ = writeln!(
                out,
                "    {} {}",
                assertion.property.short_name, assertion.target.short_name
            );
        }
        for data in kb.data_property_assertions(&individual)? {
            let _ = writeln!(out, "    {} \"{}\"", data.property, data.literal);
        }
    }
    Ok(out)
}

/// Explanation request with the outline cut to a bounded size
pub fn explain_request(kb: &dyn KnowledgeBase) -> Result<CompletionRequest> {
    let outline = outline(kb)?;
    if outline.chars().count() > MAX_EXPLAIN_CHARS {
        tracing::info!("Ontology outline truncated to {} characters", MAX_EXPLAIN_CHARS);
    }
    let user = format!(
        "Please analyze this ontology and explain what it represents:\n\n{}",
        truncate_with_marker(&outline, MAX_EXPLAIN_CHARS)
    );
    Ok(CompletionRequest::new(SYSTEM_PROMPT, user).with_temperature(EXPLAIN_TEMPERATURE))
}

/// Ask the completion service for a bullet-point explanation
pub async fn explain_ontology(
    kb: &dyn KnowledgeBase,
    completion: &dyn CompletionService,
) -> QueryResult<String> {
    let request = explain_request(kb)?;
    let explanation = completion.complete(&request).await?;
    tracing::info!("Received ontology explanation ({} chars)", explanation.len());
    Ok(explanation)
}
