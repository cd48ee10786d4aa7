use super::Session;
use anyhow::Result;
use regit_core::types::DependencyRecord;

pub fn add(session: &Session, deps: &[String]) -> Result<()> {
    let record = session.orchestrator(false)?.add_deps(deps)?;
    print_deps(&record);
    Ok(())
}

pub fn remove(session: &Session, deps: &[String]) -> Result<()> {
    let record = session.orchestrator(false)?.remove_deps(deps)?;
    print_deps(&record);
    Ok(())
}

pub fn set(session: &Session, deps: &[String]) -> Result<()> {
    let record = session.orchestrator(false)?.set_deps(deps)?;
    print_deps(&record);
    Ok(())
}

fn print_deps(record: &DependencyRecord) {
    println!("Dependencies: {}", format_list(&record.deps));
}

pub fn format_list(deps: &[String]) -> String {
    if deps.is_empty() {
        "(none)".to_string()
    } else {
        deps.join(", ")
    }
}
