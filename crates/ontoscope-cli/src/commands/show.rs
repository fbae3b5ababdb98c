//! Show command

use crate::output::{format_view, OutputFormat};
use crate::{AppContext, Cli};
use ontoscope_core::{GraphView, KnowledgeBase};

pub async fn run(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = cli.output_format();
    let view = GraphView::seed(ctx.kb.as_ref())?;
    let snapshot = view.snapshot(ctx.kb.as_ref())?;

    if format == OutputFormat::Table && !cli.quiet {
        if let Some(title) = ctx.kb.title() {
            println!("Knowledge base: {}\n", title);
        }
    }
    println!("{}", format_view(&snapshot, format).trim_end());
    Ok(())
}
