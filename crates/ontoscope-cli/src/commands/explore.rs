//! Explore command: interactive exploration shell

use std::sync::Arc;

use crate::commands::ask::print_outcome;
use crate::interactive::{Prompt, PromptClarifier, SummaryObserver};
use crate::output::format_view;
use crate::{AppContext, Cli};
use ontoscope_core::Toggled;
use ontoscope_query::{run_query, CompletionService, ExplorationSession, QueryResult};

const HELP: &str = "\
Commands:
  ask <question>     classify and run a question
  expand <name>      show the direct children of an entity
  collapse <name>    hide what expand added
  toggle <name>      expand or collapse
  highlight <name>   select an entity, revealing it if hidden
  unpin <name>       stop keeping an entity visible
  unpin-all          drop every pin
  view               print the current view
  refresh            start again from the initial view
  help               show this help
  quit               leave the shell";

/// Apply a view command by entity name; `None` if no entity has that name
fn apply(session: &mut ExplorationSession, command: &str, name: &str) -> QueryResult<Option<String>> {
    let message = match command {
        "expand" => session.expand(name)?.map(|e| format!("Expanded {}", e.short_name)),
        "collapse" => session.collapse(name)?.map(|e| format!("Collapsed {}", e.short_name)),
        "toggle" => session.toggle(name)?.map(|(e, toggled)| match toggled {
            Toggled::Expanded => format!("Expanded {}", e.short_name),
            Toggled::Collapsed => format!("Collapsed {}", e.short_name),
        }),
        "highlight" => session.highlight(name)?.map(|e| format!("Selected {}", e.short_name)),
        "unpin" => session.unpin(name)?.map(|e| format!("Unpinned {}", e.short_name)),
        _ => None,
    };
    Ok(message)
}

pub async fn run(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = cli.output_format();
    let mut session = ctx
        .session()?
        .with_observer(Box::new(SummaryObserver::new(cli.quiet)));

    let completion: Option<Arc<dyn CompletionService>> = match ctx.completion() {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::warn!("Questions disabled: {:#}", e);
            None
        }
    };

    let mut prompt = Prompt::new();
    println!("Ontoscope explorer, session {}. Type 'help' for commands.", session.id());

    while let Some(line) = prompt.read_line("ontoscope> ").await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match command.as_str() {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "view" => {
                let snapshot = session.view().snapshot(session.knowledge_base())?;
                println!("{}", format_view(&snapshot, format).trim_end());
            }
            "unpin-all" => {
                if let Err(e) = session.clear_pins() {
                    eprintln!("Error: {}", e);
                }
            }
            "refresh" => {
                if let Err(e) = session.refresh() {
                    eprintln!("Error: {}", e);
                }
            }
            "ask" => {
                if rest.is_empty() {
                    println!("Usage: ask <question>");
                    continue;
                }
                let Some(service) = completion.clone() else {
                    eprintln!(
                        "No completion service configured. Set an API key with \
                         `ontoscope config set api_key <key>` or OPENAI_API_KEY."
                    );
                    continue;
                };
                let mut clarifier = PromptClarifier::new(&mut prompt);
                match run_query(&mut session, service, &mut clarifier, rest).await {
                    Ok(outcome) => {
                        print_outcome(&outcome, format, None)?;
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "expand" | "collapse" | "toggle" | "highlight" | "unpin" => {
                if rest.is_empty() {
                    println!("Usage: {} <name>", command);
                    continue;
                }
                match apply(&mut session, &command, rest) {
                    Ok(Some(message)) => println!("{}", message),
                    Ok(None) => println!("No entity named '{}'", rest),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            other => println!("Unknown command: {}. Type 'help' for commands.", other),
        }
    }

    tracing::debug!("Explorer session {} closed", session.id());
    Ok(())
}
