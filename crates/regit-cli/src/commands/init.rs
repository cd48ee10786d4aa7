use super::Session;
use anyhow::Result;
use tracing::info;

pub fn run(session: &Session, base: Option<&str>, deps: &[String]) -> Result<()> {
    let base = base.unwrap_or(&session.config.init.default_base);
    let mut orchestrator = session.orchestrator(false)?;
    let record = orchestrator.init(base, deps)?;

    println!("Branch initialized:");
    println!("  Base:         {base}");
    println!("  Dependencies: {}", super::deps::format_list(&record.deps));
    println!(
        "  Rebase tip:   {}",
        record.rebase_tip.as_deref().unwrap_or("-")
    );
    println!();
    println!("Next step: run `git dep update` whenever the base or a dependency moves.");

    info!(base, deps = record.deps.len(), "branch initialized");
    Ok(())
}
