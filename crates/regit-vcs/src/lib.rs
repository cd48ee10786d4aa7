pub mod adapter;
pub mod command;
pub mod git2_adapter;
pub mod outcome;

pub use adapter::VcsAdapter;
pub use command::{GitOutput, GitRunner};
pub use git2_adapter::{Git2VcsAdapter, RepoPaths};
pub use outcome::{EntryState, MergeOutcome, RebaseOutcome};

#[cfg(test)]
mod tests {
    use super::{Git2VcsAdapter, RepoPaths};

    #[test]
    fn crate_exports_are_usable() {
        let temp = tempfile::tempdir().unwrap();
        assert!(RepoPaths::discover(temp.path()).is_err());
        assert!(Git2VcsAdapter::discover(temp.path(), "git").is_err());
    }
}
