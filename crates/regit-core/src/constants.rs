/// Prefix of every branch the tool creates for its own bookkeeping.
pub const RESERVED_PREFIX: &str = "regit/";

/// Commit message of synthetic synchronization commits, ignored by
/// "missing commits" checks. Matched against the whole message.
pub const MARKER_DEPENDENCY_UPDATE: &str = "DEPENDENCY UPDATE";

/// Subject prefix of dependency merge commits.
pub const MARKER_DEPENDENCY_MERGE: &str = "DEPENDENCY MERGE: ";

/// Subject of the manifest commit written by export.
pub const MARKER_DEPENDENCY_COMMIT: &str = "DEPENDENCY COMMIT";

/// Directory under the git dir holding records and operation state.
pub const STATE_DIR: &str = "regit";

/// Per-branch dependency records, below [`STATE_DIR`].
pub const BRANCHES_DIR: &str = "branches";

/// Single-slot operation state file, below [`STATE_DIR`].
pub const OPERATION_STATE_FILE: &str = "state";

/// Default global config directory name under home.
pub const DEFAULT_CONFIG_DIR: &str = ".regit";

/// Project config file, relative to the repository root.
pub const PROJECT_CONFIG_FILE: &str = ".regit/config.toml";

/// Environment variable exported to every git child process.
pub const CHILD_ENV_MARKER: &str = "REGIT";
