use super::Session;
use anyhow::{Context, Result};
use regit_graph::RebaseTipSource;

pub fn run(session: &Session, commit: Option<&str>, base: bool) -> Result<()> {
    let source = if base {
        RebaseTipSource::BaseHead
    } else {
        RebaseTipSource::Commit(commit.context("a commit or --base is required")?.to_string())
    };
    let tip = session.orchestrator(false)?.set_rebase_tip(source)?;
    println!("Rebase tip set to {tip}.");
    Ok(())
}
