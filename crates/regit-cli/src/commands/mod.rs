pub mod delete_branch;
pub mod deps;
pub mod export;
pub mod init;
pub mod operation;
pub mod rebase_tip;
pub mod reference;
pub mod show;
pub mod status;
pub mod update;

use anyhow::{Context, Result, bail};
use regit_core::config::Config;
use regit_graph::{BranchId, Orchestrator};
use regit_state::{FileRecordStore, OperationStore, StateLayout};
use regit_vcs::{Git2VcsAdapter, RepoPaths};

pub type RepoOrchestrator<'a> = Orchestrator<'a, Git2VcsAdapter, FileRecordStore>;

/// Everything a command needs to act on one repository.
pub struct Session {
    pub config: Config,
    pub vcs: Git2VcsAdapter,
    pub records: FileRecordStore,
    pub operations: OperationStore,
}

impl Session {
    pub fn open(paths: RepoPaths, config: Config) -> Self {
        let layout = StateLayout::new(&paths.git_dir);
        let vcs = Git2VcsAdapter::open(paths, &config.vcs.git_binary);
        Self {
            records: FileRecordStore::new(layout.clone()),
            operations: OperationStore::new(layout),
            vcs,
            config,
        }
    }

    /// Reserved branches stay out of the graph unless an interrupted
    /// operation left one checked out.
    pub fn orchestrator(&self, include_reserved: bool) -> Result<RepoOrchestrator<'_>> {
        Ok(Orchestrator::load(
            &self.vcs,
            &self.records,
            &self.operations,
            include_reserved,
        )?)
    }

    /// Refuse to start anything new while an update waits for `--continue`.
    pub fn ensure_idle(&self) -> Result<()> {
        if !self.operations.exists() {
            return Ok(());
        }
        match self.operations.load()? {
            Some(state) => bail!(
                "an update of `{}` is in progress; finish it with `git dep --continue` \
                 or cancel it with `git dep --abort`",
                state.branch
            ),
            None => Ok(()),
        }
    }
}

pub fn current_branch(orchestrator: &RepoOrchestrator<'_>) -> Result<BranchId> {
    orchestrator
        .graph()
        .current()
        .context("HEAD is detached; check out a branch first")
}
