use super::Session;
use anyhow::Result;

pub fn run(session: &Session, label: &str) -> Result<()> {
    let reference = session.orchestrator(false)?.set_external_reference(label)?;
    println!("External reference set to {reference}.");
    Ok(())
}
