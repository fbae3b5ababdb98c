//! Config command for managing CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use ontoscope_core::KnowledgeBase;
use ontoscope_store::MemoryKnowledgeBase;

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key name
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key name
        key: String,
        /// New value (empty clears optional keys)
        value: String,
    },
    /// List all config values (API key masked)
    List,
    /// Show config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(key),
        ConfigCommands::Set { key, value } => run_set(key, value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init { force } => run_init(*force),
    }
}

fn run_get(key: &str) -> anyhow::Result<()> {
    let config = Config::load();
    match config.get(key) {
        Some(value) => println!("{}", value),
        None => anyhow::bail!(
            "Unknown config key: {}. Available keys: {}",
            key,
            Config::keys().join(", ")
        ),
    }
    Ok(())
}

/// One-line description of a loadable snapshot
fn describe_knowledge_base(path: &Path) -> anyhow::Result<String> {
    let kb = MemoryKnowledgeBase::load(path)
        .with_context(|| format!("Failed to load knowledge base {}", path.display()))?;
    let stats = kb.stats()?;
    Ok(format!(
        "{} ({} classes, {} properties, {} individuals)",
        kb.title().unwrap_or_else(|| "untitled".to_string()),
        stats.classes,
        stats.object_properties,
        stats.individuals
    ))
}

/// Only snapshots that load are stored, as absolute paths so they keep
/// working from any directory
fn checked_knowledge_base(value: &str) -> anyhow::Result<(String, Option<String>)> {
    if value.trim().is_empty() {
        return Ok((String::new(), None));
    }
    let path = PathBuf::from(value);
    let summary = describe_knowledge_base(&path)?;
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    Ok((path.display().to_string(), Some(summary)))
}

fn run_set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load();
    let (value, summary) = match key {
        "knowledge_base" => checked_knowledge_base(value)?,
        _ => (value.to_string(), None),
    };
    config.set(key, &value)?;
    config.save()?;
    let shown = config.display_value(key).unwrap_or_default();
    println!("Set {} = {}", key, shown);
    if let Some(summary) = summary {
        println!("Knowledge base: {}", summary);
    }
    Ok(())
}

fn run_list() -> anyhow::Result<()> {
    let config = Config::load();
    println!("Config file: {}", config_file_path().display());
    println!();
    for key in Config::keys() {
        let value = config.display_value(key).unwrap_or_default();
        println!("{} = {}", key, value);
    }

    // Effective values, after environment overrides
    let settings = config.completion_settings();
    println!();
    println!("Completion: {} at {}", settings.model, settings.base_url);
    if settings.api_key.is_empty() {
        println!("Questions disabled: no API key");
    }
    if let Some(path) = &config.knowledge_base {
        match describe_knowledge_base(path) {
            Ok(summary) => println!("Knowledge base: {}", summary),
            Err(e) => println!("Knowledge base unavailable: {:#}", e),
        }
    }
    Ok(())
}

fn run_path() -> anyhow::Result<()> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_init(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save()?;
    println!("Created config file at {}", path.display());
    Ok(())
}
