use super::{Session, current_branch};
use anyhow::Result;
use regit_graph::{UpdateOptions, UpdateOutcome};

pub fn run(session: &Session, recursive: bool, force: bool) -> Result<()> {
    let options = UpdateOptions {
        recursive: recursive || session.config.update.recursive,
        force,
    };
    let mut orchestrator = session.orchestrator(false)?;
    let id = current_branch(&orchestrator)?;
    let outcome = orchestrator.update_current(options)?;
    let name = orchestrator.graph().display_name(id);

    match outcome {
        UpdateOutcome::Synchronized => println!("Branch {name} updated."),
        UpdateOutcome::UpToDate | UpdateOutcome::AlreadyProcessed => {
            println!("Branch {name} is up to date.")
        }
        UpdateOutcome::Unmanaged => {
            println!("Branch {name} has no dependency record; run `git dep init` first.")
        }
    }

    let warnings = orchestrator.diagnostics().len();
    if warnings > 0 {
        println!("{warnings} warning(s) reported; see the log above.");
    }
    Ok(())
}
