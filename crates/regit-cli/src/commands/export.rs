use super::{Session, current_branch};
use anyhow::Result;
use tracing::info;

pub fn run(session: &Session, name: Option<&str>) -> Result<()> {
    let mut orchestrator = session.orchestrator(false)?;
    let id = current_branch(&orchestrator)?;
    let report = orchestrator.export(id, name, session.config.export.ignore_whitespace)?;

    println!("Exported {} to {}.", report.branch, report.target);
    println!("  Dependency commit: {}", report.pivot);
    println!("Now on {}.", report.target);
    info!(branch = %report.branch, target = %report.target, "export finished");
    Ok(())
}

pub fn squash(session: &Session) -> Result<()> {
    let mut orchestrator = session.orchestrator(false)?;
    let report = orchestrator.squash(session.config.export.ignore_whitespace)?;

    println!("Squashed dependency merges of {}.", report.branch);
    println!("  Rebase tip: {}", report.pivot);
    Ok(())
}
