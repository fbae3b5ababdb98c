//! Terminal plumbing shared by `ask` and `explore`

use std::io::Write;

use async_trait::async_trait;
use ontoscope_core::{EntityRef, ViewObserver, ViewSnapshot};
use ontoscope_query::Clarifier;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::output::summarize_view;

/// Line reader over stdin
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prompt` and read one line; `None` at end of input
    pub async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        print!("{}", prompt);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers clarification questions from the terminal
pub struct PromptClarifier<'a> {
    prompt: &'a mut Prompt,
}

impl<'a> PromptClarifier<'a> {
    pub fn new(prompt: &'a mut Prompt) -> Self {
        Self { prompt }
    }
}

#[async_trait]
impl Clarifier for PromptClarifier<'_> {
    async fn clarify(&mut self, question: &str) -> Option<String> {
        println!("Clarification needed: {}", question);
        match self.prompt.read_line("answer (empty to cancel)> ").await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Could not read clarification: {}", e);
                None
            }
        }
    }
}

/// Prints a one-line summary whenever the view changes
pub struct SummaryObserver {
    quiet: bool,
}

impl SummaryObserver {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ViewObserver for SummaryObserver {
    fn on_view_changed(&mut self, snapshot: &ViewSnapshot) {
        if !self.quiet {
            println!("{}", summarize_view(snapshot));
        }
    }

    fn request_center_on(&mut self, entity: &EntityRef) {
        tracing::debug!("Centering on {}", entity.short_name);
        if !self.quiet {
            println!("Focus: {} ({})", entity.short_name, entity.kind);
        }
    }
}
