//! Ontoscope CLI - explore a knowledge base with natural-language questions

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod interactive;
mod output;

use commands::{ask, classify, completions, explain, explore, show};
use config::Config;
use ontoscope_core::KnowledgeBase;
use ontoscope_query::{CompletionService, ExplorationSession};
use ontoscope_store::MemoryKnowledgeBase;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "ontoscope")]
#[command(author, version, about = "Explore ontologies with natural-language questions")]
pub struct Cli {
    /// Knowledge base snapshot (JSON); defaults to the configured one
    #[arg(short, long, global = true, env = "ONTOSCOPE_KB")]
    pub kb: Option<PathBuf>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the initial view of the knowledge base
    Show,
    /// Ask one question and print the result
    Ask(ask::AskArgs),
    /// Interactive exploration shell
    Explore,
    /// Parse a raw completion response into a query intent
    Classify(classify::ClassifyArgs),
    /// Ask the completion service to describe the knowledge base
    Explain,
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the loaded knowledge base
pub struct AppContext {
    pub config: Config,
    pub kb: Arc<MemoryKnowledgeBase>,
}

impl AppContext {
    pub fn load(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let path = cli
            .kb
            .clone()
            .or_else(|| config.knowledge_base.clone())
            .context(
                "No knowledge base given. Pass --kb <file> or run \
                 `ontoscope config set knowledge_base <file>`",
            )?;
        tracing::debug!("Loading knowledge base from: {:?}", path);

        let kb = MemoryKnowledgeBase::load(&path)
            .with_context(|| format!("Failed to load knowledge base {}", path.display()))?;
        let stats = kb.stats()?;
        tracing::info!(
            "Loaded {} classes, {} properties, {} individuals",
            stats.classes,
            stats.object_properties,
            stats.individuals
        );

        Ok(Self {
            config,
            kb: Arc::new(kb),
        })
    }

    pub fn knowledge_base(&self) -> Arc<dyn KnowledgeBase> {
        self.kb.clone()
    }

    /// New exploration session with a seeded view
    pub fn session(&self) -> anyhow::Result<ExplorationSession> {
        let session = ExplorationSession::new(self.knowledge_base())?
            .with_temperature(self.config.temperature);
        Ok(session)
    }

    /// Completion service built from config and environment
    #[cfg(feature = "openai")]
    pub fn completion(&self) -> anyhow::Result<Arc<dyn CompletionService>> {
        let settings = self.config.completion_settings();
        let service = ontoscope_query::OpenAiCompletion::new(settings)
            .context("No completion service available")?;
        Ok(Arc::new(service))
    }

    #[cfg(not(feature = "openai"))]
    pub fn completion(&self) -> anyhow::Result<Arc<dyn CompletionService>> {
        anyhow::bail!("This build has no completion service; rebuild with the `openai` feature")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting ontoscope CLI");

    // Commands that need no knowledge base
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        Commands::Classify(args) => return classify::run(args, &cli).await,
        _ => {}
    }

    let ctx = AppContext::load(&cli, Config::load())?;

    match &cli.command {
        Commands::Show => show::run(&cli, &ctx).await?,
        Commands::Ask(args) => ask::run(args, &cli, &ctx).await?,
        Commands::Explore => explore::run(&cli, &ctx).await?,
        Commands::Explain => explain::run(&cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) | Commands::Classify(_) => {}
    }

    Ok(())
}
