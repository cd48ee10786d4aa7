use super::Session;
use anyhow::Result;

pub fn run(session: &Session, branches: &[String]) -> Result<()> {
    let deleted = session.orchestrator(false)?.delete_branches(branches)?;
    if deleted.is_empty() {
        println!("No branches deleted.");
    }
    for branch in &deleted {
        println!("Deleted branch {branch}.");
    }
    Ok(())
}
