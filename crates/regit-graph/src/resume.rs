use crate::orchestrator::Orchestrator;
use regit_core::error::{GraphError, StateError, UpdateError};
use regit_core::namespace::ReservedBranch;
use regit_core::types::{OperationPhase, OperationState};
use regit_state::RecordStore;
use regit_vcs::VcsAdapter;
use tracing::info;

impl<V: VcsAdapter, R: RecordStore> Orchestrator<'_, V, R> {
    /// Finish the interrupted operation after the operator resolved it.
    ///
    /// Preconditions are checked before the operation state is consumed, so
    /// a refused continue can simply be retried.
    pub fn continue_operation(&mut self) -> Result<String, UpdateError> {
        let pending = self
            .operations
            .load()?
            .ok_or(StateError::NoOperationInProgress)?;
        if pending.phase == OperationPhase::Rebase {
            if self.vcs.rebase_in_progress()? {
                return Err(UpdateError::RebaseInProgress);
            }
            if pending.new_rebase_tip.is_none() {
                return Err(StateError::corrupt_operation_state(
                    self.operations.path().display().to_string(),
                    "rebase phase without new_rebase_tip",
                )
                .into());
            }
        }
        self.require_clean()?;

        let state = self.operations.take()?;
        info!(branch = %state.branch, phase = %state.phase, "continuing update");
        match state.phase {
            OperationPhase::Merge => self.resume_merge(&state)?,
            OperationPhase::Rebase => self.resume_rebase(&state)?,
        }
        Ok(state.branch)
    }

    fn resume_merge(&mut self, state: &OperationState) -> Result<(), UpdateError> {
        let id = self.graph.require(&state.branch)?;
        self.hydrate_closure(id)?;
        let links = self.managed_links(id)?;

        let integration = self
            .graph
            .require(&ReservedBranch::integration(&state.branch).name())?;
        self.switch(integration)?;

        let mut queue = Vec::new();
        let mut already_done = state.already_done.clone();
        for dep_name in &state.deps {
            if state.already_done.contains(dep_name) || *dep_name == state.base {
                continue;
            }
            let dep = self
                .graph
                .lookup(dep_name)
                .ok_or_else(|| GraphError::UnknownDependency {
                    branch: state.branch.clone(),
                    dependency: dep_name.clone(),
                })?;
            // The manually finished merge, and anything already part of
            // the base, is contained in the integration branch.
            if self.missing_from(integration, dep)? {
                queue.push(dep);
            } else if state.conflict.as_ref() == Some(dep_name) {
                already_done.push(dep_name.clone());
            }
        }

        self.merge_dependencies(id, &links, queue, already_done)?;
        self.rebase_onto_integration(id, &links, integration)?;
        self.graph.mark_processed(id);
        Ok(())
    }

    fn resume_rebase(&mut self, state: &OperationState) -> Result<(), UpdateError> {
        let id = self.graph.require(&state.branch)?;
        self.hydrate_closure(id)?;
        self.managed_links(id)?;
        self.graph
            .require(&ReservedBranch::workspace(&state.branch).name())?;
        let new_tip = state.new_rebase_tip.as_deref().ok_or_else(|| {
            StateError::corrupt_operation_state(
                self.operations.path().display().to_string(),
                "rebase phase without new_rebase_tip",
            )
        })?;
        info!(branch = %state.branch, "continuing rebase");
        self.fold_back(id, new_tip)?;
        self.graph.mark_processed(id);
        Ok(())
    }

    /// Cancel the interrupted operation and return to its branch.
    pub fn abort_operation(&mut self) -> Result<String, UpdateError> {
        let state = self.operations.take()?;
        info!(branch = %state.branch, phase = %state.phase, "aborting");
        let workspace = ReservedBranch::workspace(&state.branch);
        match state.phase {
            OperationPhase::Rebase => {
                if self.vcs.rebase_head_name()?.as_deref() == Some(workspace.ref_name().as_str()) {
                    self.vcs.rebase_abort()?;
                }
            }
            OperationPhase::Merge => {
                if self.vcs.merge_in_progress()? {
                    self.vcs.merge_abort()?;
                }
            }
        }

        let id = self.graph.require(&state.branch)?;
        self.vcs.checkout_existing(&state.branch)?;
        self.graph.set_current(id);
        let workspace = workspace.name();
        if self.vcs.rev_parse(&format!("refs/heads/{workspace}"))?.is_some() {
            self.vcs.delete_branch(&workspace)?;
        }
        Ok(state.branch)
    }
}
