//! Explain command

use crate::{AppContext, Cli};
use ontoscope_query::explain_ontology;

pub async fn run(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let completion = ctx.completion()?;
    if !cli.quiet {
        eprintln!("Analyzing knowledge base...");
    }
    let explanation = explain_ontology(ctx.kb.as_ref(), completion.as_ref()).await?;
    println!("{}", explanation.trim_end());
    Ok(())
}
