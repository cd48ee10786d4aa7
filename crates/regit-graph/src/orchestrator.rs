use crate::graph::{BranchGraph, BranchId, ManagedLinks};
use regit_core::constants::MARKER_DEPENDENCY_UPDATE;
use regit_core::diagnostics::Diagnostics;
use regit_core::error::{GraphError, Suspension, UpdateError};
use regit_core::types::OperationState;
use regit_state::{OperationStore, RecordStore};
use regit_vcs::VcsAdapter;
use std::collections::HashMap;
use tracing::debug;

/// Drives every multi-step git operation of one invocation.
///
/// Owns the branch graph for the invocation; the VCS and both stores are
/// borrowed collaborators. The operation-specific entry points live in
/// `update`, `resume`, `export`, `manage` and `status`.
pub struct Orchestrator<'a, V: VcsAdapter, R: RecordStore> {
    pub(crate) vcs: &'a V,
    pub(crate) records: &'a R,
    pub(crate) operations: &'a OperationStore,
    pub(crate) graph: BranchGraph,
    pub(crate) diagnostics: Diagnostics,
}

impl<'a, V: VcsAdapter, R: RecordStore> Orchestrator<'a, V, R> {
    pub fn new(
        vcs: &'a V,
        records: &'a R,
        operations: &'a OperationStore,
        graph: BranchGraph,
    ) -> Self {
        Self {
            vcs,
            records,
            operations,
            graph,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Build the branch graph from the repository and wrap it.
    pub fn load(
        vcs: &'a V,
        records: &'a R,
        operations: &'a OperationStore,
        include_reserved: bool,
    ) -> Result<Self, GraphError> {
        let graph = BranchGraph::load(vcs, include_reserved)?;
        Ok(Self::new(vcs, records, operations, graph))
    }

    pub fn graph(&self) -> &BranchGraph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn current_or_detached(&self) -> Result<BranchId, UpdateError> {
        self.graph.current().ok_or(UpdateError::DetachedHead)
    }

    pub(crate) fn require_clean(&self) -> Result<(), UpdateError> {
        if self.vcs.working_tree_clean()? {
            Ok(())
        } else {
            Err(UpdateError::DirtyWorkingTree)
        }
    }

    pub(crate) fn hydrate_closure(&mut self, id: BranchId) -> Result<(), GraphError> {
        self.graph
            .hydrate_closure(id, self.records, &mut self.diagnostics)
    }

    pub(crate) fn managed_links(&self, id: BranchId) -> Result<ManagedLinks, GraphError> {
        self.graph
            .links(id)
            .cloned()
            .ok_or_else(|| GraphError::NotManaged {
                branch: self.graph.name(id).to_string(),
            })
    }

    /// Check out an existing branch unless it already is.
    pub(crate) fn switch(&mut self, id: BranchId) -> Result<(), UpdateError> {
        if self.graph.current() == Some(id) {
            return Ok(());
        }
        debug!(branch = self.graph.name(id), "switching branch");
        self.vcs.checkout_existing(self.graph.name(id))?;
        self.graph.set_current(id);
        Ok(())
    }

    /// Create or reset `name` at `start_point` and check it out.
    pub(crate) fn switch_new(
        &mut self,
        name: &str,
        start_point: &str,
    ) -> Result<BranchId, UpdateError> {
        debug!(branch = name, start_point, "resetting branch");
        self.vcs.checkout_new_from(name, start_point)?;
        let id = self.graph.ensure(name);
        self.graph.set_current(id);
        Ok(id)
    }

    pub(crate) fn head(&self, id: BranchId) -> Result<String, UpdateError> {
        Ok(self.vcs.head_of(self.graph.name(id))?)
    }

    /// `y` has commits not reachable from `x`, ignoring update markers.
    pub fn missing_from(&self, x: BranchId, y: BranchId) -> Result<bool, UpdateError> {
        Ok(self.vcs.commit_range_excluding_marker(
            self.graph.name(x),
            self.graph.name(y),
            MARKER_DEPENDENCY_UPDATE,
        )?)
    }

    /// The merge base of `x` and `y` is the head of `y`.
    pub fn based_on(&self, x: BranchId, y: BranchId) -> Result<bool, UpdateError> {
        let merge_base = self
            .vcs
            .merge_base(self.graph.name(x), self.graph.name(y))?;
        Ok(merge_base == self.head(y)?)
    }

    /// `id` lacks commits from its base or one of its dependencies. Unlike
    /// [`needs_update`](Self::needs_update) this ignores upstream staleness.
    pub fn behind_upstream(&self, id: BranchId) -> Result<bool, UpdateError> {
        let Some(links) = self.graph.links(id) else {
            return Ok(false);
        };
        for upstream in std::iter::once(links.base).chain(links.deps.iter().copied()) {
            if upstream != id && self.missing_from(id, upstream)? {
                debug!(
                    branch = self.graph.name(id),
                    upstream = self.graph.name(upstream),
                    "missing upstream commits"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Base or any dependency needs an update, or `id` lacks commits from one
    /// of them. Expects the closure of `id` to be hydrated.
    pub fn needs_update(&self, id: BranchId) -> Result<bool, UpdateError> {
        self.needs_update_memo(id, &mut HashMap::new())
    }

    fn needs_update_memo(
        &self,
        id: BranchId,
        memo: &mut HashMap<BranchId, bool>,
    ) -> Result<bool, UpdateError> {
        if let Some(known) = memo.get(&id) {
            return Ok(*known);
        }
        let mut result = false;
        if let Some(links) = self.graph.links(id) {
            let upstream: Vec<BranchId> = std::iter::once(links.base)
                .chain(links.deps.iter().copied())
                .collect();
            for dep in upstream {
                if self.needs_update_memo(dep, memo)? || self.missing_from(id, dep)? {
                    debug!(
                        branch = self.graph.name(id),
                        upstream = self.graph.name(dep),
                        "needs update"
                    );
                    result = true;
                    break;
                }
            }
        }
        memo.insert(id, result);
        Ok(result)
    }

    /// Write the operation state and turn it into the suspension error.
    pub(crate) fn suspend(&self, state: OperationState) -> UpdateError {
        let suspension = Suspension {
            phase: state.phase,
            branch: state.branch.clone(),
            conflict: state.conflict.clone(),
            state_file: self.operations.path(),
        };
        match self.operations.save(&state) {
            Ok(()) => UpdateError::Suspended(suspension),
            Err(err) => err.into(),
        }
    }

    /// Store a new rebase tip in memory and in the branch's record.
    ///
    /// Only `rebase_tip` of the stored record changes; entries filtered
    /// during hydration stay on disk.
    pub(crate) fn persist_rebase_tip(
        &mut self,
        id: BranchId,
        tip: &str,
    ) -> Result<(), UpdateError> {
        let name = self.graph.name(id).to_string();
        self.graph.set_rebase_tip(id, tip);
        let mut record = match self.records.load(&name)? {
            Some(record) => record,
            None => self
                .graph
                .to_record(id)
                .ok_or(GraphError::NotManaged { branch: name.clone() })?,
        };
        record.rebase_tip = Some(tip.to_string());
        self.records.save(&name, &record)?;
        debug!(branch = %name, rebase_tip = tip, "recorded rebase tip");
        Ok(())
    }
}
