use super::Session;
use anyhow::Result;
use regit_graph::{BranchStatus, DependencyStatus, StatusOptions, StatusReport};

pub fn run(session: &Session, all: bool, recursive_deps: bool, dot: bool) -> Result<()> {
    let options = StatusOptions {
        all,
        recursive_deps,
        dot,
    };
    match session.orchestrator(false)?.status(options)? {
        StatusReport::Dot(graph) => print!("{graph}"),
        StatusReport::Branches(branches) => {
            for branch in &branches {
                for line in render_branch(branch) {
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}

fn render_branch(status: &BranchStatus) -> Vec<String> {
    let mut lines = Vec::new();
    if status.up_to_date {
        lines.push(format!("branch {} is up to date.", status.name));
    } else {
        lines.push(format!("branch {} needs update.", status.name));
    }
    if let Some(base) = &status.part_of_base {
        lines.push(format!("  it is part of {base}."));
    }
    if !status.dependencies.is_empty() {
        lines.push("  dependencies:".to_string());
        lines.extend(status.dependencies.iter().map(render_dependency));
    }
    if !status.indirect_dependencies.is_empty() {
        lines.push("  indirect dependencies:".to_string());
        lines.extend(status.indirect_dependencies.iter().map(render_dependency));
    }
    lines
}

/// `->` marks a dependency whose commits the branch still lacks.
fn render_dependency(dep: &DependencyStatus) -> String {
    let marker = if dep.missing { "  ->" } else { "    " };
    let name = if dep.part_of_base {
        format!("({})", dep.name)
    } else {
        dep.name.clone()
    };
    let suffix = if dep.needs_update {
        " (needs update itself)"
    } else {
        ""
    };
    format!("  {marker} {name}{suffix}")
}
