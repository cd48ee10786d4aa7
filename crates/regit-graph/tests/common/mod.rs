#![allow(dead_code)]

use regit_core::error::UpdateError;
use regit_graph::{Orchestrator, UpdateOptions, UpdateOutcome};
use regit_state::{FileRecordStore, OperationStore, RecordStore, StateLayout};
use regit_vcs::{Git2VcsAdapter, VcsAdapter};
use std::path::Path;
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub vcs: Git2VcsAdapter,
    pub records: FileRecordStore,
    pub operations: OperationStore,
}

impl TestRepo {
    /// Fresh repository on `main` with one commit holding `shared.txt`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "user.name", "test"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        git(dir.path(), &["config", "rerere.enabled", "false"]);
        std::fs::write(dir.path().join("shared.txt"), "base\n").unwrap();
        git(dir.path(), &["add", "shared.txt"]);
        git(dir.path(), &["commit", "-q", "-m", "initial"]);

        let vcs = Git2VcsAdapter::discover(dir.path(), "git").unwrap();
        let layout = StateLayout::new(&vcs.paths().git_dir);
        Self {
            records: FileRecordStore::new(layout.clone()),
            operations: OperationStore::new(layout),
            vcs,
            dir,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) {
        git(self.path(), args);
    }

    pub fn git_output(&self, args: &[&str]) -> String {
        git_output(self.path(), args)
    }

    pub fn commit_file(&self, file: &str, content: &str, message: &str) {
        std::fs::write(self.path().join(file), content).unwrap();
        self.git(&["add", file]);
        self.git(&["commit", "-q", "-m", message]);
    }

    pub fn checkout(&self, branch: &str) {
        self.git(&["checkout", "-q", branch]);
    }

    pub fn branch_from(&self, branch: &str, start: &str) {
        self.git(&["checkout", "-q", "-b", branch, start]);
    }

    pub fn head(&self, rev: &str) -> String {
        self.git_output(&["rev-parse", rev])
    }

    pub fn branch_exists(&self, branch: &str) -> bool {
        self.vcs
            .rev_parse(&format!("refs/heads/{branch}"))
            .unwrap()
            .is_some()
    }

    pub fn current_branch(&self) -> Option<String> {
        self.vcs.current_branch().unwrap()
    }

    pub fn subjects(&self, range: &str) -> Vec<String> {
        let out = self.git_output(&["log", "--format=%s", range]);
        out.lines().map(str::to_string).collect()
    }

    pub fn merge_subjects(&self, range: &str) -> Vec<String> {
        let out = self.git_output(&["log", "--merges", "--format=%s", range]);
        out.lines().map(str::to_string).collect()
    }

    pub fn count(&self, range: &str) -> usize {
        self.git_output(&["rev-list", "--count", range]).parse().unwrap()
    }

    pub fn rebase_tip(&self, branch: &str) -> String {
        self.records
            .load(branch)
            .unwrap()
            .unwrap()
            .rebase_tip
            .unwrap()
    }

    pub fn orchestrator(
        &self,
        include_reserved: bool,
    ) -> Orchestrator<'_, Git2VcsAdapter, FileRecordStore> {
        Orchestrator::load(&self.vcs, &self.records, &self.operations, include_reserved).unwrap()
    }

    /// Record `base` and `deps` for the checked-out branch.
    pub fn init(&self, base: &str, deps: &[&str]) {
        let deps: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
        self.orchestrator(false).init(base, &deps).unwrap();
    }

    pub fn update(&self) -> Result<UpdateOutcome, UpdateError> {
        self.update_with(UpdateOptions::default())
    }

    pub fn update_with(&self, options: UpdateOptions) -> Result<UpdateOutcome, UpdateError> {
        self.orchestrator(false).update_current(options)
    }

    pub fn resume(&self) -> Result<String, UpdateError> {
        self.orchestrator(true).continue_operation()
    }

    pub fn abort(&self) -> Result<String, UpdateError> {
        self.orchestrator(true).abort_operation()
    }

    /// `feature` (base `main`, dependency `lib`) with three own commits,
    /// after which main gains two commits and lib one more.
    pub fn feature_scenario() -> Self {
        let repo = Self::new();
        repo.branch_from("lib", "main");
        repo.commit_file("lib.txt", "lib v1\n", "lib: first");
        repo.branch_from("feature", "main");
        repo.init("main", &["lib"]);
        for n in 1..=3 {
            repo.commit_file(
                &format!("feature{n}.txt"),
                &format!("feature {n}\n"),
                &format!("feature: step {n}"),
            );
        }

        repo.checkout("main");
        repo.commit_file("main1.txt", "main 1\n", "main: one");
        repo.commit_file("main2.txt", "main 2\n", "main: two");
        repo.checkout("lib");
        repo.commit_file("lib.txt", "lib v2\n", "lib: second");
        repo.checkout("feature");
        repo
    }
}

pub fn git(repo: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo)
        .env("GIT_EDITOR", "true")
        .output()
        .expect("run git command");
    assert!(
        output.status.success(),
        "git {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn git_output(repo: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("run git command");
    assert!(
        output.status.success(),
        "git {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
