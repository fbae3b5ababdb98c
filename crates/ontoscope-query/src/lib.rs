//! Ontoscope Query - natural-language questions over a knowledge base
//!
//! A question goes through three steps:
//!
//! 1. [`prompt`] builds a classification request describing the knowledge base
//! 2. a [`CompletionService`] answers it and [`QueryClassifier`] turns the
//!    answer into a [`QueryIntent`]
//! 3. [`QueryExecutor`] runs the intent and updates a [`GraphView`](ontoscope_core::GraphView)
//!
//! [`ExplorationSession`] ties the steps together, including clarification
//! rounds for ambiguous questions, and [`run_query`] drives a session against
//! a live service.

pub mod classifier;
pub mod completion;
pub mod driver;
pub mod error;
pub mod executor;
pub mod explain;
pub mod intent;
#[cfg(feature = "openai")]
pub mod openai;
pub mod prompt;
pub mod session;
pub mod suggest;

pub use classifier::QueryClassifier;
pub use completion::{CompletionRequest, CompletionService, CompletionSettings};
pub use driver::{run_query, Clarifier, NoClarification, QueryOutcome};
pub use error::{ClassifyError, CompletionError, QueryError, QueryResult, SessionError};
pub use executor::{Outcome, QueryExecutor, QueryReport};
pub use explain::explain_ontology;
pub use intent::{Filter, QueryIntent, QueryKind};
#[cfg(feature = "openai")]
pub use openai::OpenAiCompletion;
pub use session::{ExplorationSession, SessionEvent, SessionPhase};
