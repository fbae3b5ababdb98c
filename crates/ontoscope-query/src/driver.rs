//! Async driver for a session's query protocol
//!
//! Runs the classify / clarify / execute loop against a real
//! [`CompletionService`]. Each completion call runs on its own task so a
//! slow service never blocks the caller's runtime thread.

use crate::completion::{CompletionRequest, CompletionService};
use crate::error::{CompletionError, SessionError};
use crate::executor::QueryReport;
use crate::session::{ExplorationSession, SessionEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of answers to clarification questions
#[async_trait]
pub trait Clarifier: Send {
    /// Answer `question`; `None` cancels the query
    async fn clarify(&mut self, question: &str) -> Option<String>;
}

/// Clarifier that always declines
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClarification;

#[async_trait]
impl Clarifier for NoClarification {
    async fn clarify(&mut self, _question: &str) -> Option<String> {
        None
    }
}

/// How a submitted query ended
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Completed(QueryReport),
    Failed(String),
    Cancelled(String),
}

impl QueryOutcome {
    pub fn report(&self) -> Option<&QueryReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

async fn request_completion(
    completion: &Arc<dyn CompletionService>,
    request: CompletionRequest,
) -> Result<String, CompletionError> {
    let service = Arc::clone(completion);
    tokio::spawn(async move { service.complete(&request).await })
        .await
        .unwrap_or_else(|e| Err(CompletionError::Network(format!("completion task failed: {}", e))))
}

/// Drive `query` through the session until it completes, fails or is cancelled
pub async fn run_query(
    session: &mut ExplorationSession,
    completion: Arc<dyn CompletionService>,
    clarifier: &mut dyn Clarifier,
    query: &str,
) -> Result<QueryOutcome, SessionError> {
    let mut event = session.submit(query)?;
    loop {
        event = match event {
            SessionEvent::Classify(request) => {
                let response = request_completion(&completion, request).await;
                session.complete(response)?
            }
            SessionEvent::NeedsClarification { question } => {
                tracing::info!("Clarification needed: {}", question);
                let answer = clarifier.clarify(&question).await;
                session.clarify(answer.as_deref())?
            }
            SessionEvent::Completed(report) => return Ok(QueryOutcome::Completed(report)),
            SessionEvent::Failed { message } => return Ok(QueryOutcome::Failed(message)),
            SessionEvent::Cancelled { message } => return Ok(QueryOutcome::Cancelled(message)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionPhase, CANCELLED_MESSAGE};
    use ontoscope_core::KnowledgeBase;
    use ontoscope_store::MemoryKnowledgeBase;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replies with canned responses in order, recording each request
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionService for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::InvalidResponse("script exhausted".into())))
        }
    }

    struct Answers {
        answers: VecDeque<Option<String>>,
        questions: Vec<String>,
    }

    #[async_trait]
    impl Clarifier for Answers {
        async fn clarify(&mut self, question: &str) -> Option<String> {
            self.questions.push(question.to_string());
            self.answers.pop_front().flatten()
        }
    }

    fn session() -> ExplorationSession {
        let kb = MemoryKnowledgeBase::with_title("Ramayana");
        kb.add_subclass("urn:r#King", "urn:r#Person").unwrap();
        kb.assert_type("urn:r#Dasharatha", "urn:r#King").unwrap();
        kb.assert_type("urn:r#Rama", "urn:r#Person").unwrap();
        let kb: Arc<dyn KnowledgeBase> = Arc::new(kb);
        ExplorationSession::new(kb).unwrap()
    }

    #[tokio::test]
    async fn test_direct_query() {
        let mut session = session();
        let service = Scripted::new(vec![Ok("QUERY_TYPE: instances\nTARGET: King".into())]);

        let outcome = run_query(
            &mut session,
            service.clone(),
            &mut NoClarification,
            "List the kings",
        )
        .await
        .unwrap();

        let report = outcome.report().unwrap();
        assert!(report.is_found());
        assert!(report.body.contains("Dasharatha"));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(service.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ambiguity_round_trip() {
        let mut session = session();
        let service = Scripted::new(vec![
            Ok(r#"{"type": "ambiguous", "question": "Which person do you mean?"}"#.into()),
            Ok("QUERY_TYPE: individual\nTARGET: Dasharatha".into()),
        ]);
        let mut clarifier = Answers {
            answers: VecDeque::from([Some("the king".to_string())]),
            questions: Vec::new(),
        };

        let outcome = run_query(&mut session, service.clone(), &mut clarifier, "Who is the person?")
            .await
            .unwrap();

        assert_eq!(clarifier.questions, vec!["Which person do you mean?"]);
        let seen = service.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].user.contains("Who is the person? the king"));

        let report = outcome.report().unwrap();
        assert_eq!(report.query, "Who is the person? the king");
        assert!(report.body.contains("Individual: Dasharatha"));
    }

    #[tokio::test]
    async fn test_declined_clarification() {
        let mut session = session();
        let service = Scripted::new(vec![Ok(
            r#"{"type": "ambiguous", "question": "Which person?"}"#.into(),
        )]);

        let outcome = run_query(&mut session, service, &mut NoClarification, "Who is the person?")
            .await
            .unwrap();

        assert_eq!(outcome, QueryOutcome::Cancelled(CANCELLED_MESSAGE.into()));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_service_failure() {
        let mut session = session();
        let before = session.view().clone();
        let service = Scripted::new(vec![Err(CompletionError::Auth {
            status: 401,
            body: "bad key".into(),
        })]);

        let outcome = run_query(&mut session, service, &mut NoClarification, "List the kings")
            .await
            .unwrap();

        let QueryOutcome::Failed(message) = outcome else {
            panic!("expected failure, got {:?}", outcome);
        };
        assert!(message.contains("401"));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.view().vertices(), before.vertices());
    }

    #[tokio::test]
    async fn test_busy_session_rejects_new_query() {
        let mut session = session();
        session.submit("List the kings").unwrap();

        let service = Scripted::new(vec![]);
        let err = run_query(&mut session, service.clone(), &mut NoClarification, "Another")
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Busy);
        assert!(service.seen.lock().unwrap().is_empty());
    }
}
