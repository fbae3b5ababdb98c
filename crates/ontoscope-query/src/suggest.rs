//! "Did you mean" suggestions for names that failed to resolve

use ontoscope_core::limits::MAX_SUGGESTIONS;
use ontoscope_core::{lookup, EntityKind, KnowledgeBase, Result};

#[cfg(feature = "fuzzy")]
use nucleo_matcher::{
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
    Config, Matcher,
};

/// Best fuzzy matches for `needle` among `names`, highest score first
#[cfg(feature = "fuzzy")]
pub fn closest_names(names: &[String], needle: &str, limit: usize) -> Vec<String> {
    let needle = needle.trim();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(needle, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);

    let mut buf = Vec::new();
    let mut scored: Vec<(&String, u32)> = names
        .iter()
        .filter_map(|name| {
            pattern
                .score(nucleo_matcher::Utf32Str::new(name, &mut buf), &mut matcher)
                .map(|score| (name, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored.into_iter().take(limit).map(|(n, _)| n.clone()).collect()
}

/// Names containing `needle`, ignoring case
#[cfg(not(feature = "fuzzy"))]
pub fn closest_names(names: &[String], needle: &str, limit: usize) -> Vec<String> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut found: Vec<String> = names
        .iter()
        .filter(|n| n.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    found.sort();
    found.truncate(limit);
    found
}

/// Up to three names of `kind` that look like `needle`
pub fn suggest(kb: &dyn KnowledgeBase, kind: EntityKind, needle: &str) -> Result<Vec<String>> {
    let names: Vec<String> = lookup::entities_of_kind(kb, kind)?
        .into_iter()
        .filter(|e| !e.id.is_builtin_class())
        .map(|e| e.short_name)
        .collect();
    Ok(closest_names(&names, needle, MAX_SUGGESTIONS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["Rama", "Ravana", "Sita", "Lakshmana", "Hanuman"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[cfg(feature = "fuzzy")]
    #[test]
    fn test_fuzzy_subsequence() {
        let found = closest_names(&names(), "rvn", 3);
        assert_eq!(found, vec!["Ravana"]);
    }

    #[cfg(feature = "fuzzy")]
    #[test]
    fn test_fuzzy_limit() {
        let found = closest_names(&names(), "a", 2);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_no_match_and_empty_needle() {
        assert!(closest_names(&names(), "xyz", 3).is_empty());
        assert!(closest_names(&names(), "  ", 3).is_empty());
    }

    #[test]
    fn test_suggest_against_knowledge_base() {
        let kb = ontoscope_store::MemoryKnowledgeBase::new();
        kb.add_individual("urn:r#Ravana").unwrap();
        kb.add_individual("urn:r#Sita").unwrap();
        kb.add_class("urn:r#Rakshasa").unwrap();

        let found = suggest(&kb, EntityKind::Individual, "Ravan").unwrap();
        assert_eq!(found, vec!["Ravana"]);
    }
}
