//! Full question flow over the demo knowledge base with a scripted service

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ontoscope_core::KnowledgeBase;
use ontoscope_query::{
    run_query, CompletionError, CompletionRequest, CompletionService, ExplorationSession,
    NoClarification, Outcome, QueryOutcome,
};
use ontoscope_store::MemoryKnowledgeBase;

struct Scripted(Mutex<VecDeque<String>>);

#[async_trait]
impl CompletionService for Scripted {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CompletionError::InvalidResponse("no more replies".into()))
    }
}

fn scripted(replies: &[&str]) -> Arc<Scripted> {
    Arc::new(Scripted(Mutex::new(
        replies.iter().map(|r| r.to_string()).collect(),
    )))
}

fn session() -> ExplorationSession {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/ramayana.json");
    let kb: Arc<dyn KnowledgeBase> = Arc::new(MemoryKnowledgeBase::load(path).unwrap());
    ExplorationSession::new(kb).unwrap()
}

#[tokio::test]
async fn test_complex_query_pins_every_match() {
    let mut session = session();
    let service = scripted(&[r#"```json
{"type": "complex", "target": "King", "filters": [{"property": "rules", "value": "Ayodhya"}]}
```"#]);

    let outcome = run_query(&mut session, service, &mut NoClarification, "Which kings rule Ayodhya?")
        .await
        .unwrap();
    let QueryOutcome::Completed(report) = outcome else {
        panic!("expected a report, got {:?}", outcome);
    };

    assert_eq!(report.outcome, Outcome::Found);
    assert_eq!(report.filter_count, 1);
    assert_eq!(report.matches, vec!["Dasharatha", "Rama"]);

    let view = session.view();
    let pinned: Vec<&str> = view.pinned().iter().map(|e| e.short_name.as_str()).collect();
    assert!(pinned.contains(&"Dasharatha"));
    assert!(pinned.contains(&"Rama"));
    assert!(!pinned.contains(&"Ravana"));
    assert_eq!(view.selected().map(|e| e.short_name.as_str()), Some("Rama"));
}

#[tokio::test]
async fn test_unknown_target_suggests_names() {
    let mut session = session();
    let service = scripted(&["QUERY_TYPE: relationships\nTARGET: Hanumn"]);

    let outcome = run_query(&mut session, service, &mut NoClarification, "What does Hanumn do?")
        .await
        .unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.outcome, Outcome::NotFound);
    assert!(report.body.contains("Hanuman"));
    assert!(session.view().selected().is_none());
}

#[tokio::test]
async fn test_sequential_queries_replace_selection() {
    let mut session = session();
    let service = scripted(&[
        "QUERY_TYPE: individual\nTARGET: Ravana",
        "QUERY_TYPE: instances\nTARGET: Kingdom",
    ]);

    run_query(&mut session, service.clone(), &mut NoClarification, "Who is Ravana?")
        .await
        .unwrap();
    let ravana = session.view().selected().cloned().unwrap();
    assert_eq!(ravana.short_name, "Ravana");
    assert!(session.view().contains(&ravana));

    run_query(&mut session, service, &mut NoClarification, "List the kingdoms")
        .await
        .unwrap();
    assert_eq!(
        session.view().selected().map(|e| e.short_name.as_str()),
        Some("Kingdom")
    );
    assert!(!session.view().contains(&ravana));
}
