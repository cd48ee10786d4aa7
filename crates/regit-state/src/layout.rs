use regit_core::constants::{BRANCHES_DIR, OPERATION_STATE_FILE, STATE_DIR};
use regit_core::error::StateError;
use std::path::{Path, PathBuf};

/// On-disk layout of the tool's state inside a repository's git directory.
///
/// ```text
/// <git-dir>/regit/branches/<branch with '/' replaced by "__">
/// <git-dir>/regit/state
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    git_dir: PathBuf,
}

impl StateLayout {
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn state_dir(&self) -> PathBuf {
        self.git_dir.join(STATE_DIR)
    }

    pub fn branches_dir(&self) -> PathBuf {
        self.state_dir().join(BRANCHES_DIR)
    }

    pub fn operation_file(&self) -> PathBuf {
        self.state_dir().join(OPERATION_STATE_FILE)
    }

    /// Record file for `branch`.
    pub fn record_file(&self, branch: &str) -> PathBuf {
        self.branches_dir().join(encode_branch_name(branch))
    }

    pub fn ensure_dirs(&self) -> Result<(), StateError> {
        std::fs::create_dir_all(self.branches_dir())?;
        Ok(())
    }
}

/// Hierarchical branch names flatten into one file name.
pub fn encode_branch_name(branch: &str) -> String {
    branch.replace('/', "__")
}
