use super::Session;
use anyhow::Result;
use tracing::info;

/// Finish an update that stopped on a conflict. A further conflict
/// suspends it again with fresh instructions.
pub fn resume(session: &Session) -> Result<()> {
    let mut orchestrator = session.orchestrator(true)?;
    let branch = orchestrator.continue_operation()?;
    println!("Branch `{branch}` updated.");
    info!(branch = %branch, "operation continued");
    Ok(())
}

pub fn abort(session: &Session) -> Result<()> {
    let mut orchestrator = session.orchestrator(true)?;
    let branch = orchestrator.abort_operation()?;
    println!("Update of `{branch}` aborted.");
    info!(branch = %branch, "operation aborted");
    Ok(())
}
