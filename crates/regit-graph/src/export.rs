use crate::graph::BranchId;
use crate::orchestrator::Orchestrator;
use regit_core::constants::MARKER_DEPENDENCY_COMMIT;
use regit_core::error::UpdateError;
use regit_core::namespace::ReservedBranch;
use regit_state::RecordStore;
use regit_vcs::VcsAdapter;
use tracing::{info, warn};

/// Where an export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub branch: String,
    pub target: String,
    /// Manifest commit, or the base head when there are no dependencies.
    /// The branch's own commits sit on top of it.
    pub pivot: String,
}

impl<V: VcsAdapter, R: RecordStore> Orchestrator<'_, V, R> {
    /// Rewrite `id` as a merge-free branch: base, one manifest commit with
    /// the dependency content, then the branch's own commits as patches.
    pub fn export(
        &mut self,
        id: BranchId,
        target: Option<&str>,
        ignore_whitespace: bool,
    ) -> Result<ExportReport, UpdateError> {
        self.require_clean()?;
        self.hydrate_closure(id)?;
        let links = self.managed_links(id)?;
        let branch = self.graph.name(id).to_string();
        let base = self.graph.name(links.base).to_string();
        let target = target
            .map(str::to_string)
            .unwrap_or_else(|| ReservedBranch::export(&branch).name());
        if target == branch || target == base {
            return Err(UpdateError::InvalidArgument(format!(
                "cannot export `{branch}` onto `{target}`"
            )));
        }
        if self.needs_update(id)? {
            warn!(branch = %branch, "branch needs update; exporting its last synchronized state");
        }

        info!(branch = %branch, target = %target, "exporting");
        self.switch_new(&target, &base)?;
        let pivot = if links.deps.is_empty() {
            self.vcs.head_of(&target)?
        } else {
            self.vcs.diff_apply(&base, &links.rebase_tip)?;
            self.vcs.commit(&self.manifest_message(id, &base))?;
            self.vcs.head_of(&target)?
        };
        self.vcs
            .format_patch_apply(&links.rebase_tip, &branch, ignore_whitespace)?;

        Ok(ExportReport {
            branch,
            target,
            pivot,
        })
    }

    fn manifest_message(&self, id: BranchId, base: &str) -> String {
        format!(
            "{MARKER_DEPENDENCY_COMMIT}\n\n\
             This commit contains the following dependencies:\n\n\
             {}\nBase branch: {base}",
            self.graph.dependency_listing(id, "    ", true)
        )
    }

    /// Replace the checked-out branch by its export and move its rebase tip
    /// to the pivot.
    pub fn squash(&mut self, ignore_whitespace: bool) -> Result<ExportReport, UpdateError> {
        let id = self.current_or_detached()?;
        self.squash_branch(id, ignore_whitespace)
    }

    pub fn squash_branch(
        &mut self,
        id: BranchId,
        ignore_whitespace: bool,
    ) -> Result<ExportReport, UpdateError> {
        if self.graph.current() != Some(id) {
            return Err(UpdateError::WrongActiveBranch {
                expected: self.graph.name(id).to_string(),
                actual: self
                    .graph
                    .current()
                    .map(|current| self.graph.name(current).to_string())
                    .unwrap_or_else(|| "<detached>".to_string()),
            });
        }
        let workspace = ReservedBranch::workspace(self.graph.name(id)).name();
        let report = self.export(id, Some(&workspace), ignore_whitespace)?;

        self.switch(id)?;
        self.vcs.reset_hard(&report.target)?;
        self.vcs.delete_branch(&report.target)?;
        self.persist_rebase_tip(id, &report.pivot)?;
        info!(branch = %report.branch, rebase_tip = %report.pivot, "squashed dependencies");
        Ok(report)
    }
}
