/// Result of a merge that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// Git stopped with the merge in progress (conflicts in the index).
    Conflict,
}

/// Result of starting or continuing a rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseOutcome {
    Completed,
    /// Git stopped mid-rebase; the rebase directory is still present.
    Conflict,
}

/// Classification of one non-untracked working-tree status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Change staged in the index (added, deleted, modified or renamed),
    /// with nothing left in the working tree.
    Staged,
    /// Unmerged path or unstaged modification.
    Pending,
}

impl EntryState {
    /// Classify a git2 status. Only `A`/`D`/`M`/`R` index changes count as
    /// staged; type changes, conflicts and any worktree change are pending.
    pub fn from_status(status: git2::Status) -> Self {
        let staged = git2::Status::INDEX_NEW
            | git2::Status::INDEX_DELETED
            | git2::Status::INDEX_MODIFIED
            | git2::Status::INDEX_RENAMED;
        if status.is_conflicted() || !staged.contains(status) || status.is_empty() {
            Self::Pending
        } else {
            Self::Staged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Status;

    #[test]
    fn staged_only_entries_are_staged() {
        assert_eq!(EntryState::from_status(Status::INDEX_NEW), EntryState::Staged);
        assert_eq!(
            EntryState::from_status(Status::INDEX_MODIFIED | Status::INDEX_RENAMED),
            EntryState::Staged
        );
    }

    #[test]
    fn worktree_changes_and_conflicts_are_pending() {
        assert_eq!(
            EntryState::from_status(Status::INDEX_MODIFIED | Status::WT_MODIFIED),
            EntryState::Pending
        );
        assert_eq!(EntryState::from_status(Status::CONFLICTED), EntryState::Pending);
        assert_eq!(
            EntryState::from_status(Status::INDEX_TYPECHANGE),
            EntryState::Pending
        );
    }
}
