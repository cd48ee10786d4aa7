use crate::graph::BranchId;
use crate::orchestrator::Orchestrator;
use regit_core::error::UpdateError;
use regit_core::namespace::ReservedBranch;
use regit_state::RecordStore;
use regit_vcs::VcsAdapter;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOptions {
    /// Every managed branch instead of only the checked-out one.
    pub all: bool,
    /// Also list the dependencies of dependencies.
    pub recursive_deps: bool,
    /// Graphviz output instead of text.
    pub dot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub name: String,
    /// The branch lacks commits from this dependency.
    pub missing: bool,
    pub needs_update: bool,
    /// Fully contained in its own base.
    pub part_of_base: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStatus {
    pub name: String,
    pub up_to_date: bool,
    /// Set when the branch is up to date and fully contained in this base.
    pub part_of_base: Option<String>,
    pub dependencies: Vec<DependencyStatus>,
    pub indirect_dependencies: Vec<DependencyStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    Branches(Vec<BranchStatus>),
    Dot(String),
}

impl<V: VcsAdapter, R: RecordStore> Orchestrator<'_, V, R> {
    pub fn status(&mut self, options: StatusOptions) -> Result<StatusReport, UpdateError> {
        self.require_clean()?;
        let candidates: Vec<BranchId> = if options.all {
            self.graph.ids().collect()
        } else {
            vec![self.current_or_detached()?]
        };

        let mut branches = Vec::new();
        let mut edges = BTreeSet::new();
        for id in candidates {
            let name = self.graph.name(id);
            if ReservedBranch::is_reserved(name) || !self.records.exists(name) {
                continue;
            }
            self.hydrate_closure(id)?;
            if options.dot {
                self.graph.collect_dot_edges(id, &mut edges);
            } else {
                branches.push(self.branch_status(id, options.recursive_deps)?);
            }
        }

        if options.dot {
            Ok(StatusReport::Dot(render_dot(&edges)))
        } else {
            Ok(StatusReport::Branches(branches))
        }
    }

    fn branch_status(
        &self,
        id: BranchId,
        recursive_deps: bool,
    ) -> Result<BranchStatus, UpdateError> {
        let up_to_date = !self.needs_update(id)?;
        let part_of_base = match self.graph.links(id) {
            Some(links) if up_to_date && !self.missing_from(links.base, id)? => {
                Some(self.graph.name(links.base).to_string())
            }
            _ => None,
        };
        Ok(BranchStatus {
            name: self.graph.display_name(id),
            up_to_date,
            part_of_base,
            dependencies: self.dependency_statuses(id, self.graph.collect_deps(id, false, true))?,
            indirect_dependencies: self
                .dependency_statuses(id, self.graph.collect_deps(id, recursive_deps, false))?,
        })
    }

    fn dependency_statuses(
        &self,
        id: BranchId,
        deps: Vec<BranchId>,
    ) -> Result<Vec<DependencyStatus>, UpdateError> {
        deps.into_iter()
            .map(|dep| {
                let part_of_base = match self.graph.links(dep) {
                    Some(links) => !self.missing_from(links.base, dep)?,
                    None => false,
                };
                Ok(DependencyStatus {
                    name: self.graph.display_name(dep),
                    missing: self.missing_from(id, dep)?,
                    needs_update: self.needs_update(dep)?,
                    part_of_base,
                })
            })
            .collect()
    }
}

pub fn render_dot(edges: &BTreeSet<String>) -> String {
    let mut out = String::from("digraph \"regit branch dependencies\" {\n");
    for edge in edges {
        out.push_str(edge);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_output_wraps_sorted_edges() {
        let edges: BTreeSet<String> = ["\"b\" -> \"main\"", "\"a\" -> \"b\""]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            render_dot(&edges),
            "digraph \"regit branch dependencies\" {\n\"a\" -> \"b\"\n\"b\" -> \"main\"\n}\n"
        );
    }
}
