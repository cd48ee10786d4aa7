use crate::types::OperationPhase;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config value: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("not a git repository: {path}")]
    NotGitRepo { path: String },

    #[error("git error: {0}")]
    GitError(String),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

impl VcsError {
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("corrupt dependency record {path}: {reason}")]
    CorruptRecord { path: String, reason: String },

    #[error("corrupt operation state {path}: {reason}; inspect or remove it manually")]
    CorruptOperationState { path: String, reason: String },

    #[error("an operation is already recorded in {path}")]
    OperationSlotOccupied { path: String },

    #[error("no operation in progress")]
    NoOperationInProgress,

    #[error("branch dependency record already exists: {path}")]
    RecordExists { path: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StateError {
    pub fn corrupt_record(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::CorruptRecord {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn corrupt_operation_state(
        path: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::CorruptOperationState {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("cannot work on reserved branch `{name}`")]
    ReservedBranch { name: String },

    #[error("unknown branch `{name}`")]
    UnknownBranch { name: String },

    #[error("branch `{branch}` has unknown base branch `{base}`")]
    UnknownBase { branch: String, base: String },

    #[error("branch `{branch}` depends on unknown branch `{dependency}`")]
    UnknownDependency { branch: String, dependency: String },

    #[error("dependency record of branch `{branch}` has no base branch")]
    MissingBase { branch: String },

    #[error("branch `{branch}` has unset rebase tip")]
    MissingRebaseTip { branch: String },

    #[error("dependency cycle: {path}")]
    Cycle { path: String },

    #[error("branch `{branch}` is not managed (no dependency record)")]
    NotManaged { branch: String },

    #[error("branch `{branch}` needs rebase to `{base}`")]
    NeedsRebase { branch: String, base: String },

    #[error("invalid commit reference `{reference}`")]
    InvalidCommit { reference: String },

    #[error("branch `{branch}` is the base of `{dependents}` and has no base of its own")]
    OrphanedDependents { branch: String, dependents: String },

    #[error("vcs error: {0}")]
    Vcs(#[from] VcsError),

    #[error("state error: {0}")]
    State(#[from] StateError),
}

/// A synchronization stopped on a conflict; the operation state has been
/// written and the run must be finished with `--continue` or `--abort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suspension {
    pub phase: OperationPhase,
    pub branch: String,
    pub conflict: Option<String>,
    pub state_file: PathBuf,
}

impl std::fmt::Display for Suspension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            OperationPhase::Merge => write!(
                f,
                "merging `{}` while updating `{}` failed (probably due to conflicts); \
                 fix the conflicts, finish the merge (git merge --continue), \
                 then run `git dep --continue`",
                self.conflict.as_deref().unwrap_or("?"),
                self.branch
            ),
            OperationPhase::Rebase => write!(
                f,
                "rebasing `{}` failed; complete the rebase manually, then run \
                 `git dep --continue` if it succeeded, or `git dep --abort` to cancel",
                self.branch
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("workdir unclean; commit or stash your changes")]
    DirtyWorkingTree,

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    #[error("{0}")]
    Suspended(Suspension),

    #[error("a rebase is still in progress; finish it (git rebase --continue) or abort")]
    RebaseInProgress,

    #[error("expected `{expected}` to be checked out, found `{actual}`")]
    WrongActiveBranch { expected: String, actual: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl UpdateError {
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended(_))
    }
}
