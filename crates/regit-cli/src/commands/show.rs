use super::Session;
use anyhow::Result;

pub fn run(session: &Session, branch: Option<&str>) -> Result<()> {
    let mut orchestrator = session.orchestrator(false)?;
    let id = match branch {
        Some(name) => Some(orchestrator.graph().require(name)?),
        None => None,
    };
    let summary = orchestrator.show(id)?;

    println!("Branch......: {}", summary.branch);
    println!("Base........: {}", summary.base);
    println!("Dependencies: {}", super::deps::format_list(&summary.deps));
    println!("Rebase tip..: {}", summary.rebase_tip);
    Ok(())
}
