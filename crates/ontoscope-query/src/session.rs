//! Exploration session state machine
//!
//! An [`ExplorationSession`] owns one [`GraphView`] and drives a single
//! question at a time through classification, optional clarification rounds
//! and execution:
//!
//! ```text
//! Idle -> Classifying -> Ambiguous -> (answer) -> Classifying ...
//!                     |            -> (decline) -> Idle
//!                     -> Resolved -> Executing -> Done -> Idle
//!                     -> Failed -> Idle
//! ```
//!
//! The session performs no I/O. Each step returns a [`SessionEvent`] telling
//! the caller what to do next; a [`SessionEvent::Classify`] carries the
//! completion request the caller must run and feed back through
//! [`ExplorationSession::complete`].

use crate::classifier::QueryClassifier;
use crate::completion::{CompletionRequest, CLASSIFY_TEMPERATURE};
use crate::error::{CompletionError, QueryResult, SessionError};
use crate::executor::{QueryExecutor, QueryReport};
use crate::prompt;
use ontoscope_core::limits::validate_query;
use ontoscope_core::{lookup, EntityRef, GraphView, KnowledgeBase, Toggled, ViewObserver};
use std::sync::Arc;
use ulid::Ulid;

/// Message shown when the user declines to clarify
pub const CANCELLED_MESSAGE: &str = "Query cancelled or clarification not provided.";

/// Where the current submission is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Classifying,
    Ambiguous,
    Resolved,
    Executing,
    Done,
    Failed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Classifying => "classifying",
            Self::Ambiguous => "ambiguous",
            Self::Resolved => "resolved",
            Self::Executing => "executing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    fn can_transition_to(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, Classifying)
                | (Classifying, Ambiguous)
                | (Classifying, Resolved)
                | (Classifying, Failed)
                | (Ambiguous, Classifying)
                | (Ambiguous, Idle)
                | (Resolved, Executing)
                | (Executing, Done)
                | (Done, Idle)
                | (Failed, Idle)
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller must do after a session step
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Run this request on the completion service and pass the result to `complete`
    Classify(CompletionRequest),
    /// Ask the user this question and pass the answer to `clarify`
    NeedsClarification { question: String },
    /// The query ran; the session is idle again
    Completed(QueryReport),
    /// Classification failed; the session is idle again
    Failed { message: String },
    /// The user declined to clarify; the session is idle again
    Cancelled { message: String },
}

/// One user's exploration: a view plus at most one question in flight
pub struct ExplorationSession {
    id: Ulid,
    kb: Arc<dyn KnowledgeBase>,
    view: GraphView,
    phase: SessionPhase,
    original_query: Option<String>,
    current_query: Option<String>,
    classifier: QueryClassifier,
    temperature: f32,
    observer: Option<Box<dyn ViewObserver>>,
    span: tracing::Span,
}

impl ExplorationSession {
    /// Open a session over `kb` with a freshly seeded view
    pub fn new(kb: Arc<dyn KnowledgeBase>) -> QueryResult<Self> {
        let view = GraphView::seed(kb.as_ref())?;
        Ok(Self::with_view(kb, view))
    }

    /// Open a session over an existing view
    pub fn with_view(kb: Arc<dyn KnowledgeBase>, view: GraphView) -> Self {
        let id = Ulid::new();
        let span = tracing::info_span!("session", id = %id);
        span.in_scope(|| tracing::info!("Exploration session opened"));
        Self {
            id,
            kb,
            view,
            phase: SessionPhase::Idle,
            original_query: None,
            current_query: None,
            classifier: QueryClassifier::new(),
            temperature: CLASSIFY_TEMPERATURE,
            observer: None,
            span,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn ViewObserver>) -> Self {
        self.observer = Some(observer);
        self.notify();
        self
    }

    /// Sampling temperature for classification requests
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a submission is outstanding
    pub fn is_busy(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn view(&self) -> &GraphView {
        &self.view
    }

    pub fn knowledge_base(&self) -> &dyn KnowledgeBase {
        self.kb.as_ref()
    }

    /// Question text as first submitted
    pub fn original_query(&self) -> Option<&str> {
        self.original_query.as_deref()
    }

    /// Question text including any clarification answers
    pub fn current_query(&self) -> Option<&str> {
        self.current_query.as_deref()
    }

    fn transition(&mut self, next: SessionPhase) -> Result<(), SessionError> {
        if !self.phase.can_transition_to(next) {
            tracing::error!("Rejected session transition {} -> {}", self.phase, next);
            return Err(SessionError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        tracing::info!("Session {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn reset(&mut self) {
        self.original_query = None;
        self.current_query = None;
    }

    /// Leave Failed for Idle with a message
    fn fail(&mut self, message: String) -> Result<SessionEvent, SessionError> {
        tracing::error!("Query failed: {}", message);
        self.transition(SessionPhase::Failed)?;
        self.transition(SessionPhase::Idle)?;
        self.reset();
        Ok(SessionEvent::Failed { message })
    }

    fn classify_request(&mut self) -> Result<SessionEvent, SessionError> {
        let query = self.current_query.clone().unwrap_or_default();
        match prompt::classification_request(self.kb.as_ref(), &query) {
            Ok(request) => Ok(SessionEvent::Classify(request.with_temperature(self.temperature))),
            Err(e) => self.fail(format!("Could not read the knowledge base: {}", e)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query protocol
    // ─────────────────────────────────────────────────────────────────────────

    /// Start classifying a new question.
    ///
    /// Rejected with [`SessionError::Busy`] unless the session is idle.
    pub fn submit(&mut self, query: &str) -> Result<SessionEvent, SessionError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.phase != SessionPhase::Idle {
            tracing::warn!("Rejected submission while {}", self.phase);
            return Err(SessionError::Busy);
        }
        validate_query(query)?;

        let query = query.trim().to_string();
        tracing::info!("Submitted query: {}", query);
        self.original_query = Some(query.clone());
        self.current_query = Some(query);
        self.transition(SessionPhase::Classifying)?;
        self.classify_request()
    }

    /// Apply the completion service's answer to the outstanding request
    pub fn complete(
        &mut self,
        response: Result<String, CompletionError>,
    ) -> Result<SessionEvent, SessionError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.phase != SessionPhase::Classifying {
            return Err(SessionError::NotAwaitingResponse);
        }

        let text = match response {
            Ok(text) => text,
            Err(e) => return self.fail(format!("Error calling completion service: {}", e)),
        };
        tracing::debug!("Raw completion response: {}", text);

        let intent = match self.classifier.classify(&text) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!("Unusable classification: {}", e);
                return self.fail(format!(
                    "Could not understand the query ({}). Please try rephrasing.",
                    e
                ));
            }
        };

        if intent.is_ambiguous() {
            self.transition(SessionPhase::Ambiguous)?;
            let question = intent.clarification_question.unwrap_or_default();
            return Ok(SessionEvent::NeedsClarification { question });
        }

        self.transition(SessionPhase::Resolved)?;
        self.transition(SessionPhase::Executing)?;
        let query = self.current_query.clone().unwrap_or_default();
        let report = QueryExecutor::new(self.kb.as_ref()).execute(&query, &intent, &mut self.view);
        self.transition(SessionPhase::Done)?;

        self.notify();
        if let Some(entity) = &report.highlighted {
            if let Some(observer) = self.observer.as_mut() {
                observer.request_center_on(entity);
            }
        }

        self.transition(SessionPhase::Idle)?;
        self.reset();
        Ok(SessionEvent::Completed(report))
    }

    /// Answer the outstanding clarification question.
    ///
    /// `None` or a blank answer cancels the query. Otherwise the answer is
    /// appended to the query text and classification starts again.
    pub fn clarify(&mut self, answer: Option<&str>) -> Result<SessionEvent, SessionError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.phase != SessionPhase::Ambiguous {
            return Err(SessionError::NotAwaitingClarification);
        }

        let answer = answer.map(str::trim).filter(|a| !a.is_empty());
        let Some(answer) = answer else {
            tracing::info!("Clarification declined");
            self.transition(SessionPhase::Idle)?;
            self.reset();
            return Ok(SessionEvent::Cancelled {
                message: CANCELLED_MESSAGE.to_string(),
            });
        };

        let augmented = format!("{} {}", self.current_query.as_deref().unwrap_or_default(), answer);
        if let Err(e) = validate_query(&augmented) {
            tracing::warn!("Clarified query rejected: {}", e);
            self.transition(SessionPhase::Idle)?;
            self.reset();
            return Err(e.into());
        }

        tracing::info!("Re-classifying with clarification: {}", augmented);
        self.current_query = Some(augmented);
        self.transition(SessionPhase::Classifying)?;
        self.classify_request()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // View operations by name
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve(&self, name: &str) -> QueryResult<Option<EntityRef>> {
        Ok(lookup::resolve(self.kb.as_ref(), name)?)
    }

    /// Expand the entity named `name`; `None` if no entity has that name
    pub fn expand(&mut self, name: &str) -> QueryResult<Option<EntityRef>> {
        let Some(entity) = self.resolve(name)? else {
            return Ok(None);
        };
        if self.view.expand(self.kb.as_ref(), &entity)? {
            self.notify();
        }
        Ok(Some(entity))
    }

    pub fn collapse(&mut self, name: &str) -> QueryResult<Option<EntityRef>> {
        let Some(entity) = self.resolve(name)? else {
            return Ok(None);
        };
        if self.view.collapse(self.kb.as_ref(), &entity)? {
            self.notify();
        }
        Ok(Some(entity))
    }

    pub fn toggle(&mut self, name: &str) -> QueryResult<Option<(EntityRef, Toggled)>> {
        let Some(entity) = self.resolve(name)? else {
            return Ok(None);
        };
        let toggled = self.view.toggle(self.kb.as_ref(), &entity)?;
        self.notify();
        Ok(Some((entity, toggled)))
    }

    pub fn highlight(&mut self, name: &str) -> QueryResult<Option<EntityRef>> {
        let Some(entity) = self.resolve(name)? else {
            return Ok(None);
        };
        self.view.highlight(self.kb.as_ref(), &entity)?;
        self.notify();
        if let Some(observer) = self.observer.as_mut() {
            observer.request_center_on(&entity);
        }
        Ok(Some(entity))
    }

    pub fn unpin(&mut self, name: &str) -> QueryResult<Option<EntityRef>> {
        let Some(entity) = self.resolve(name)? else {
            return Ok(None);
        };
        if self.view.unpin(self.kb.as_ref(), &entity)? {
            self.notify();
        }
        Ok(Some(entity))
    }

    /// Drop every pin, including the properties pinned by the seed view
    pub fn clear_pins(&mut self) -> QueryResult<()> {
        if self.view.pinned().is_empty() {
            return Ok(());
        }
        self.view.clear_pins(self.kb.as_ref())?;
        self.notify();
        Ok(())
    }

    /// Discard the view and seed it again from the knowledge base
    pub fn refresh(&mut self) -> QueryResult<()> {
        self.view.refresh(self.kb.as_ref())?;
        tracing::info!("View refreshed: {} vertices", self.view.vertices().len());
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        match self.view.snapshot(self.kb.as_ref()) {
            Ok(snapshot) => observer.on_view_changed(&snapshot),
            Err(e) => tracing::error!("Could not snapshot view: {}", e),
        }
    }
}

impl std::fmt::Debug for ExplorationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorationSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("current_query", &self.current_query)
            .field("vertices", &self.view.vertices().len())
            .finish()
    }
}
