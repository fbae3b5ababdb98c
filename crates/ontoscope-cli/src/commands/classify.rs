//! Classify command: parse a raw completion response offline

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::output::format_intent;
use crate::Cli;
use ontoscope_query::QueryClassifier;

#[derive(Args)]
pub struct ClassifyArgs {
    /// File holding the response (stdin if omitted)
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,
}

pub async fn run(args: &ClassifyArgs, cli: &Cli) -> anyhow::Result<()> {
    let response = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let intent = QueryClassifier::new()
        .classify(&response)
        .context("Could not classify response")?;
    tracing::info!("Classified as {} '{}'", intent.kind, intent.target);

    println!("{}", format_intent(&intent, cli.output_format()).trim_end());
    Ok(())
}
