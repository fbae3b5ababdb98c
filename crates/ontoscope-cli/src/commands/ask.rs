//! Ask command: one question, one report

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::interactive::{Prompt, PromptClarifier};
use crate::output::{format_report, format_view, summarize_view, OutputFormat};
use crate::{AppContext, Cli};
use ontoscope_query::{run_query, QueryOutcome};

#[derive(Args)]
pub struct AskArgs {
    /// Question in plain language
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Save the report to a text file
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Print the resulting view after the report
    #[arg(long)]
    pub show_view: bool,
}

/// Print a finished query; returns `false` if it failed
pub fn print_outcome(
    outcome: &QueryOutcome,
    format: OutputFormat,
    save: Option<&Path>,
) -> anyhow::Result<bool> {
    match outcome {
        QueryOutcome::Completed(report) => {
            println!("{}", format_report(report, format).trim_end());
            if let Some(path) = save {
                report
                    .save(path)
                    .with_context(|| format!("Failed to save report to {}", path.display()))?;
                eprintln!("Report saved to {}", path.display());
            }
            Ok(true)
        }
        QueryOutcome::Failed(message) => {
            eprintln!("{}", message);
            Ok(false)
        }
        QueryOutcome::Cancelled(message) => {
            println!("{}", message);
            Ok(true)
        }
    }
}

pub async fn run(args: &AskArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let question = args.question.join(" ");
    let completion = ctx.completion()?;
    let mut session = ctx.session()?;
    tracing::info!("Session {} asking: {}", session.id(), question);

    let mut prompt = Prompt::new();
    let mut clarifier = PromptClarifier::new(&mut prompt);
    let outcome = run_query(&mut session, completion, &mut clarifier, &question).await?;

    let format = cli.output_format();
    let succeeded = print_outcome(&outcome, format, args.save.as_deref())?;
    if !succeeded {
        anyhow::bail!("Query failed");
    }

    let snapshot = session.view().snapshot(session.knowledge_base())?;
    if args.show_view {
        println!();
        println!("{}", format_view(&snapshot, format).trim_end());
    } else if !cli.quiet && format == OutputFormat::Table {
        println!("\n{}", summarize_view(&snapshot));
    }
    Ok(())
}
