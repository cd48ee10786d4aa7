use crate::graph::{BranchId, ManagedLinks};
use crate::orchestrator::Orchestrator;
use regit_core::constants::MARKER_DEPENDENCY_MERGE;
use regit_core::diagnostics::DiagnosticKind;
use regit_core::error::UpdateError;
use regit_core::namespace::ReservedBranch;
use regit_core::types::OperationState;
use regit_state::RecordStore;
use regit_vcs::{MergeOutcome, RebaseOutcome, VcsAdapter};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Synchronize base and dependencies first, depth-first.
    pub recursive: bool,
    /// Rebuild even when nothing upstream changed.
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Synchronized,
    UpToDate,
    /// No dependency record; nothing to do.
    Unmanaged,
    /// Already handled earlier in this run (shared dependency).
    AlreadyProcessed,
}

impl<V: VcsAdapter, R: RecordStore> Orchestrator<'_, V, R> {
    /// Synchronize the checked-out branch with its base and dependencies.
    pub fn update_current(&mut self, options: UpdateOptions) -> Result<UpdateOutcome, UpdateError> {
        self.require_clean()?;
        let id = self.current_or_detached()?;
        self.hydrate_closure(id)?;
        self.update_branch(id, options)
    }

    pub fn update_branch(
        &mut self,
        id: BranchId,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, UpdateError> {
        if self.graph.is_processed(id) {
            debug!(branch = self.graph.name(id), "skipping already updated branch");
            return Ok(UpdateOutcome::AlreadyProcessed);
        }
        let Some(links) = self.graph.links(id).cloned() else {
            info!(branch = self.graph.name(id), "no dependency information");
            self.graph.mark_processed(id);
            return Ok(UpdateOutcome::Unmanaged);
        };

        if options.recursive {
            if links.base != id {
                info!(base = self.graph.name(links.base), "updating base branch");
                self.update_branch(links.base, options)?;
            }
            for dep in &links.deps {
                info!(dependency = self.graph.name(*dep), "updating dependency");
                self.update_branch(*dep, options)?;
            }
        }

        // Own freshness only; stale dependencies are left to recursive runs.
        if !options.force && !self.behind_upstream(id)? {
            info!(branch = %self.graph.display_name(id), "branch is up to date");
            self.switch(id)?;
            self.graph.mark_processed(id);
            return Ok(UpdateOutcome::UpToDate);
        }

        info!(branch = %self.graph.display_name(id), "updating branch");
        let integration = self.prepare_integration(id, &links)?;
        let queue = self.plan_merges(id, &links, integration)?;
        self.merge_dependencies(id, &links, queue, Vec::new())?;
        self.rebase_onto_integration(id, &links, integration)?;
        self.graph.mark_processed(id);
        Ok(UpdateOutcome::Synchronized)
    }

    /// The base itself without dependencies; otherwise a fresh
    /// `regit/base/<branch>` forked from the base head.
    fn prepare_integration(
        &mut self,
        id: BranchId,
        links: &ManagedLinks,
    ) -> Result<BranchId, UpdateError> {
        if links.deps.is_empty() {
            return Ok(links.base);
        }
        let name = ReservedBranch::integration(self.graph.name(id)).name();
        let base = self.graph.name(links.base).to_string();
        self.switch_new(&name, &base)
    }

    /// Dependencies to merge, in declared order.
    ///
    /// Redundancy is all-or-nothing: a dependency with any commit missing
    /// from the base is merged in full.
    fn plan_merges(
        &mut self,
        id: BranchId,
        links: &ManagedLinks,
        integration: BranchId,
    ) -> Result<Vec<BranchId>, UpdateError> {
        let mut queue = Vec::new();
        for dep in &links.deps {
            let dep = *dep;
            if dep == links.base || dep == integration {
                continue;
            }
            let name = self.graph.name(id).to_string();
            let dep_name = self.graph.name(dep).to_string();
            if !self.missing_from(links.base, dep)? {
                self.diagnostics
                    .push(DiagnosticKind::RedundantWithBase, name, dep_name);
                continue;
            }
            if !self.based_on(dep, links.base)? {
                self.diagnostics
                    .push(DiagnosticKind::NotRebasedOnBase, name, dep_name);
            }
            queue.push(dep);
        }
        Ok(queue)
    }

    /// Merge `queue` into the checked-out integration branch.
    ///
    /// A conflict that git's conflict memory resolved completely is
    /// committed; anything else suspends in the merge phase.
    pub(crate) fn merge_dependencies(
        &mut self,
        id: BranchId,
        links: &ManagedLinks,
        queue: Vec<BranchId>,
        mut already_done: Vec<String>,
    ) -> Result<(), UpdateError> {
        for dep in queue {
            let dep_name = self.graph.name(dep).to_string();
            let message = format!("{MARKER_DEPENDENCY_MERGE}{}", self.graph.display_name(dep));
            info!(dependency = %self.graph.display_name(dep), "merging branch");
            match self.vcs.merge_no_ff(&dep_name, &message)? {
                MergeOutcome::Merged => {}
                MergeOutcome::Conflict => {
                    if self.vcs.auto_resolution_complete()? {
                        info!(dependency = %dep_name, "conflicts resolved automatically");
                        self.vcs.commit_no_edit()?;
                    } else {
                        let state = OperationState::merge(
                            self.graph.name(id),
                            self.graph.name(links.base),
                            self.dep_names(links),
                            dep_name,
                            already_done,
                        );
                        return Err(self.suspend(state));
                    }
                }
            }
            already_done.push(dep_name);
        }
        Ok(())
    }

    /// Replay the branch's own commits onto the integration head inside a
    /// disposable workspace branch.
    pub(crate) fn rebase_onto_integration(
        &mut self,
        id: BranchId,
        links: &ManagedLinks,
        integration: BranchId,
    ) -> Result<(), UpdateError> {
        let name = self.graph.name(id).to_string();
        let workspace = ReservedBranch::workspace(&name).name();
        self.switch(id)?;
        self.switch_new(&workspace, &name)?;

        let new_tip = self.head(integration)?;
        let onto = self.graph.name(integration).to_string();
        info!(branch = %name, onto = %onto, "rebasing");
        match self.vcs.rebase_onto(&onto, &links.rebase_tip)? {
            RebaseOutcome::Completed => self.fold_back(id, &new_tip),
            RebaseOutcome::Conflict => self.drive_rebase(id, links, new_tip),
        }
    }

    /// Keep continuing while conflict memory resolves each stop; suspend
    /// when a stop needs a human or a continue makes no progress.
    fn drive_rebase(
        &mut self,
        id: BranchId,
        links: &ManagedLinks,
        new_tip: String,
    ) -> Result<(), UpdateError> {
        let mut last_head = self.vcs.rev_parse("HEAD")?;
        while self.vcs.auto_resolution_complete()? {
            info!("conflicts resolved automatically; continuing rebase");
            match self.vcs.rebase_continue()? {
                RebaseOutcome::Completed => return self.fold_back(id, &new_tip),
                RebaseOutcome::Conflict => {
                    let head = self.vcs.rev_parse("HEAD")?;
                    if head == last_head {
                        debug!("rebase made no progress");
                        break;
                    }
                    last_head = head;
                }
            }
        }
        let state = OperationState::rebase(
            self.graph.name(id),
            self.graph.name(links.base),
            self.dep_names(links),
            new_tip,
        );
        Err(self.suspend(state))
    }

    /// Move the branch to the rebased workspace and record the new tip.
    pub(crate) fn fold_back(&mut self, id: BranchId, new_tip: &str) -> Result<(), UpdateError> {
        let name = self.graph.name(id).to_string();
        let workspace = ReservedBranch::workspace(&name).name();
        self.vcs.checkout_new_from(&name, &workspace)?;
        self.graph.set_current(id);
        self.vcs.delete_branch(&workspace)?;
        self.persist_rebase_tip(id, new_tip)?;
        info!(branch = %name, rebase_tip = new_tip, "branch updated");
        Ok(())
    }

    fn dep_names(&self, links: &ManagedLinks) -> Vec<String> {
        links
            .deps
            .iter()
            .map(|dep| self.graph.name(*dep).to_string())
            .collect()
    }
}
