use crate::outcome::{MergeOutcome, RebaseOutcome};
use regit_core::error::VcsError;

/// Version-control capabilities consumed by the graph and the orchestrator.
///
/// Every method operates on the repository the adapter was opened for and
/// blocks until git is done. Conflicts are reported as outcomes; every
/// other failure is a [`VcsError`].
pub trait VcsAdapter {
    /// Checked-out branch, or `None` when HEAD is detached (e.g. mid-rebase).
    fn current_branch(&self) -> Result<Option<String>, VcsError>;
    /// Sorted local branch names.
    fn all_branches(&self) -> Result<Vec<String>, VcsError>;
    fn head_of(&self, branch: &str) -> Result<String, VcsError>;
    fn merge_base(&self, a: &str, b: &str) -> Result<String, VcsError>;
    /// Resolve a revision to a commit id; `None` if it does not resolve.
    fn rev_parse(&self, rev: &str) -> Result<Option<String>, VcsError>;

    fn checkout_existing(&self, branch: &str) -> Result<(), VcsError>;
    /// Create or reset `branch` to `start_point` and check it out.
    fn checkout_new_from(&self, branch: &str, start_point: &str) -> Result<(), VcsError>;

    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<MergeOutcome, VcsError>;
    fn merge_in_progress(&self) -> Result<bool, VcsError>;
    fn merge_abort(&self) -> Result<(), VcsError>;
    /// Commit the index; an empty commit is allowed.
    fn commit(&self, message: &str) -> Result<(), VcsError>;
    /// Finish an in-progress merge with its prepared message.
    fn commit_no_edit(&self) -> Result<(), VcsError>;

    /// Replay the commits in `upstream..HEAD` onto `onto`.
    fn rebase_onto(&self, onto: &str, upstream: &str) -> Result<RebaseOutcome, VcsError>;
    fn rebase_continue(&self) -> Result<RebaseOutcome, VcsError>;
    fn rebase_abort(&self) -> Result<(), VcsError>;
    /// Ref being rebased (`refs/heads/...`), if a rebase is in progress.
    fn rebase_head_name(&self) -> Result<Option<String>, VcsError>;

    fn reset_hard(&self, rev: &str) -> Result<(), VcsError>;
    fn delete_branch(&self, branch: &str) -> Result<(), VcsError>;

    /// True if `from..to` contains a commit whose message is not exactly `marker`.
    fn commit_range_excluding_marker(
        &self,
        from: &str,
        to: &str,
        marker: &str,
    ) -> Result<bool, VcsError>;
    /// No staged or unstaged changes; untracked files are ignored.
    fn working_tree_clean(&self) -> Result<bool, VcsError>;
    /// Every remaining change is staged and conflict-free, so the pending
    /// merge/rebase step can be finalized without an operator.
    fn auto_resolution_complete(&self) -> Result<bool, VcsError>;

    /// Apply `git diff from..to` to the index and working tree.
    fn diff_apply(&self, from: &str, to: &str) -> Result<(), VcsError>;
    /// Replay `from..to` as patches on top of HEAD.
    fn format_patch_apply(
        &self,
        from: &str,
        to: &str,
        ignore_whitespace: bool,
    ) -> Result<(), VcsError>;

    fn rebase_in_progress(&self) -> Result<bool, VcsError> {
        Ok(self.rebase_head_name()?.is_some())
    }
}
