use crate::adapter::VcsAdapter;
use crate::command::GitRunner;
use crate::outcome::{EntryState, MergeOutcome, RebaseOutcome};
use git2::{BranchType, Commit, Repository, RepositoryState, StatusOptions};
use regit_core::error::VcsError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Working tree and git directory of a discovered repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    pub root: PathBuf,
    pub git_dir: PathBuf,
}

impl RepoPaths {
    /// Walk up from `start` to the enclosing non-bare repository.
    pub fn discover(start: &Path) -> Result<Self, VcsError> {
        let not_repo = || VcsError::NotGitRepo {
            path: start.display().to_string(),
        };
        let repo = Repository::discover(start).map_err(|_| not_repo())?;
        let root = repo.workdir().ok_or_else(not_repo)?.to_path_buf();
        Ok(Self {
            root,
            git_dir: repo.path().to_path_buf(),
        })
    }
}

/// Reads through libgit2; mutates through the git binary so hooks,
/// rerere and the user's git configuration apply.
#[derive(Debug, Clone)]
pub struct Git2VcsAdapter {
    paths: RepoPaths,
    git: GitRunner,
}

impl Git2VcsAdapter {
    pub fn open(paths: RepoPaths, git_binary: &str) -> Self {
        let git = GitRunner::new(git_binary, &paths.root);
        Self { paths, git }
    }

    pub fn discover(start: &Path, git_binary: &str) -> Result<Self, VcsError> {
        Ok(Self::open(RepoPaths::discover(start)?, git_binary))
    }

    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    fn open_repo(&self) -> Result<Repository, VcsError> {
        Repository::open(&self.paths.root).map_err(|_| VcsError::NotGitRepo {
            path: self.paths.root.display().to_string(),
        })
    }

    /// Branch names win over other revisions of the same spelling.
    fn commit_of<'r>(repo: &'r Repository, rev: &str) -> Result<Commit<'r>, VcsError> {
        if let Ok(branch) = repo.find_branch(rev, BranchType::Local) {
            return branch
                .get()
                .peel_to_commit()
                .map_err(|e| VcsError::GitError(format!("failed to peel branch `{rev}`: {e}")));
        }
        repo.revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| VcsError::GitError(format!("failed to resolve revision `{rev}`: {e}")))
    }

    fn rebase_dirs(&self) -> [PathBuf; 2] {
        [
            self.paths.git_dir.join("rebase-merge"),
            self.paths.git_dir.join("rebase-apply"),
        ]
    }

    fn classify_rebase(
        &self,
        success: bool,
        stderr: String,
        args: &[&str],
    ) -> Result<RebaseOutcome, VcsError> {
        if success && !self.rebase_in_progress()? {
            return Ok(RebaseOutcome::Completed);
        }
        if self.rebase_in_progress()? {
            debug!(stderr = %stderr, "rebase stopped");
            return Ok(RebaseOutcome::Conflict);
        }
        Err(VcsError::command_failed(format!("git {}", args.join(" ")), stderr))
    }

    fn status_entries(&self) -> Result<Vec<git2::Status>, VcsError> {
        let repo = self.open_repo()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .renames_head_to_index(true);
        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| VcsError::GitError(format!("failed to read status: {e}")))?;
        Ok(statuses
            .iter()
            .map(|entry| entry.status())
            .filter(|status| *status != git2::Status::CURRENT)
            .collect())
    }
}

impl VcsAdapter for Git2VcsAdapter {
    fn current_branch(&self) -> Result<Option<String>, VcsError> {
        let repo = self.open_repo()?;
        let head = repo
            .find_reference("HEAD")
            .map_err(|e| VcsError::GitError(format!("failed to read HEAD: {e}")))?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string))
    }

    fn all_branches(&self) -> Result<Vec<String>, VcsError> {
        let repo = self.open_repo()?;
        let mut names = Vec::new();
        let branches = repo
            .branches(Some(BranchType::Local))
            .map_err(|e| VcsError::GitError(format!("failed to enumerate branches: {e}")))?;
        for branch in branches {
            let (branch, _) =
                branch.map_err(|e| VcsError::GitError(format!("failed to read branch: {e}")))?;
            if let Some(name) = branch
                .name()
                .map_err(|e| VcsError::GitError(format!("failed to get branch name: {e}")))?
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn head_of(&self, branch: &str) -> Result<String, VcsError> {
        let repo = self.open_repo()?;
        Ok(Self::commit_of(&repo, branch)?.id().to_string())
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String, VcsError> {
        let repo = self.open_repo()?;
        let a = Self::commit_of(&repo, a)?.id();
        let b = Self::commit_of(&repo, b)?.id();
        let merge_base = repo
            .merge_base(a, b)
            .map_err(|e| VcsError::GitError(format!("failed to compute merge base: {e}")))?;
        Ok(merge_base.to_string())
    }

    fn rev_parse(&self, rev: &str) -> Result<Option<String>, VcsError> {
        let repo = self.open_repo()?;
        Ok(Self::commit_of(&repo, rev)
            .ok()
            .map(|commit| commit.id().to_string()))
    }

    fn checkout_existing(&self, branch: &str) -> Result<(), VcsError> {
        self.git.run_checked(&["checkout", "-q", branch]).map(|_| ())
    }

    fn checkout_new_from(&self, branch: &str, start_point: &str) -> Result<(), VcsError> {
        self.git
            .run_checked(&["checkout", "-q", "-B", branch, start_point])
            .map(|_| ())
    }

    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<MergeOutcome, VcsError> {
        let args = ["merge", "-q", "--no-ff", "--no-edit", "-m", message, branch];
        let output = self.git.run(&args)?;
        if output.success {
            return Ok(MergeOutcome::Merged);
        }
        if self.merge_in_progress()? {
            debug!(branch, stderr = %output.stderr, "merge stopped");
            return Ok(MergeOutcome::Conflict);
        }
        Err(VcsError::command_failed(
            format!("git {}", args.join(" ")),
            output.stderr,
        ))
    }

    fn merge_in_progress(&self) -> Result<bool, VcsError> {
        let repo = self.open_repo()?;
        Ok(repo.state() == RepositoryState::Merge)
    }

    fn merge_abort(&self) -> Result<(), VcsError> {
        self.git.run_checked(&["merge", "--abort"]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        self.git
            .run_checked(&["commit", "-q", "--allow-empty", "-m", message])
            .map(|_| ())
    }

    fn commit_no_edit(&self) -> Result<(), VcsError> {
        self.git.run_checked(&["commit", "-q", "--no-edit"]).map(|_| ())
    }

    fn rebase_onto(&self, onto: &str, upstream: &str) -> Result<RebaseOutcome, VcsError> {
        let args = ["rebase", "-q", "--onto", onto, upstream];
        let output = self.git.run(&args)?;
        self.classify_rebase(output.success, output.stderr, &args)
    }

    fn rebase_continue(&self) -> Result<RebaseOutcome, VcsError> {
        let args = ["rebase", "--continue"];
        let output = self.git.run(&args)?;
        self.classify_rebase(output.success, output.stderr, &args)
    }

    fn rebase_abort(&self) -> Result<(), VcsError> {
        self.git.run_checked(&["rebase", "--abort"]).map(|_| ())
    }

    fn rebase_head_name(&self) -> Result<Option<String>, VcsError> {
        for dir in self.rebase_dirs() {
            let file = dir.join("head-name");
            if file.is_file() {
                let name = std::fs::read_to_string(&file).map_err(|e| {
                    VcsError::GitError(format!("failed to read {}: {e}", file.display()))
                })?;
                return Ok(Some(name.trim().to_string()));
            }
        }
        Ok(None)
    }

    fn reset_hard(&self, rev: &str) -> Result<(), VcsError> {
        self.git.run_checked(&["reset", "-q", "--hard", rev]).map(|_| ())
    }

    fn delete_branch(&self, branch: &str) -> Result<(), VcsError> {
        self.git.run_checked(&["branch", "-q", "-D", branch]).map(|_| ())
    }

    fn commit_range_excluding_marker(
        &self,
        from: &str,
        to: &str,
        marker: &str,
    ) -> Result<bool, VcsError> {
        let repo = self.open_repo()?;
        let from = Self::commit_of(&repo, from)?.id();
        let to = Self::commit_of(&repo, to)?.id();
        let mut walk = repo
            .revwalk()
            .map_err(|e| VcsError::GitError(format!("failed to start revwalk: {e}")))?;
        walk.push(to)
            .and_then(|_| walk.hide(from))
            .map_err(|e| VcsError::GitError(format!("failed to set up revwalk: {e}")))?;
        for oid in walk {
            let oid = oid.map_err(|e| VcsError::GitError(format!("revwalk failed: {e}")))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| VcsError::GitError(format!("failed to load commit {oid}: {e}")))?;
            let message = String::from_utf8_lossy(commit.message_bytes());
            if message.trim() != marker {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn working_tree_clean(&self) -> Result<bool, VcsError> {
        Ok(self.status_entries()?.is_empty())
    }

    fn auto_resolution_complete(&self) -> Result<bool, VcsError> {
        Ok(self
            .status_entries()?
            .into_iter()
            .all(|status| EntryState::from_status(status) == EntryState::Staged))
    }

    fn diff_apply(&self, from: &str, to: &str) -> Result<(), VcsError> {
        let range = format!("{from}..{to}");
        self.git
            .pipe(&["diff", "--binary", &range], &["apply", "--index"])
            .map(|_| ())
    }

    fn format_patch_apply(
        &self,
        from: &str,
        to: &str,
        ignore_whitespace: bool,
    ) -> Result<(), VcsError> {
        let range = format!("{from}..{to}");
        let mut am = vec!["am", "-q"];
        if ignore_whitespace {
            am.push("--ignore-whitespace");
        }
        match self
            .git
            .pipe(&["format-patch", "--stdout", "--binary", &range], &am)
        {
            Ok(_) => Ok(()),
            Err(err) => {
                if self.rebase_dirs()[1].exists() {
                    // Leave no half-applied mailbox behind.
                    let _ = self.git.run(&["am", "--abort"]);
                }
                Err(err)
            }
        }
    }
}
