//! End-to-end tests driving the `git-dep` binary against throwaway repositories.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .env("GIT_EDITOR", "true")
        .output()
        .expect("run git command");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).expect("write file");
    git(repo, &["add", file]);
    git(repo, &["commit", "-q", "-m", message]);
}

/// Repository on `main` with `lib` (one commit) and an empty `feature`
/// checked out. `home` isolates the run from any user-level config.
struct Fixture {
    repo: TempDir,
    home: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let repo = tempfile::tempdir().expect("create repo dir");
        let home = tempfile::tempdir().expect("create home dir");
        let path = repo.path();
        git(path, &["init", "-q"]);
        git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(path, &["config", "user.email", "test@example.com"]);
        git(path, &["config", "user.name", "test"]);
        git(path, &["config", "commit.gpgsign", "false"]);
        commit_file(path, "shared.txt", "base\n", "initial");
        git(path, &["checkout", "-q", "-b", "lib"]);
        commit_file(path, "lib.txt", "lib\n", "lib work");
        git(path, &["checkout", "-q", "-b", "feature", "main"]);
        Self { repo, home }
    }

    fn path(&self) -> &Path {
        self.repo.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_git-dep"))
            .args(args)
            .current_dir(self.path())
            .env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("run git-dep")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "git-dep {:?} failed:\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn run_err(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "git-dep {:?} unexpectedly succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    fn advance_main(&self, file: &str, content: &str) {
        git(self.path(), &["checkout", "-q", "main"]);
        commit_file(self.path(), file, content, "main work");
        git(self.path(), &["checkout", "-q", "feature"]);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn init_update_show_roundtrip() {
    let fx = Fixture::new();
    let out = fx.run_ok(&["init", "--base", "main", "--depends-on", "lib"]);
    assert!(out.contains("Branch initialized"));
    commit_file(fx.path(), "feature.txt", "feature\n", "feature work");
    fx.advance_main("main.txt", "main\n");

    let out = fx.run_ok(&["update"]);
    assert!(out.contains("Branch feature updated."), "{out}");
    assert_eq!(
        git(fx.path(), &["log", "--format=%s", "regit/base/feature..feature"]),
        "feature work"
    );

    let out = fx.run_ok(&["update"]);
    assert!(out.contains("is up to date"), "{out}");

    let out = fx.run_ok(&["show"]);
    assert!(out.contains("Branch......: feature"));
    assert!(out.contains("Base........: main"));
    assert!(out.contains("Dependencies: lib"));
    let tip = git(fx.path(), &["rev-parse", "regit/base/feature"]);
    assert!(out.contains(&format!("Rebase tip..: {tip}")));
}

#[test]
fn init_uses_configured_default_base() {
    let fx = Fixture::new();
    let config = fx.path().join("regit.toml");
    std::fs::write(&config, "[init]\ndefault_base = \"main\"\n").unwrap();

    fx.run_ok(&["--config", config.to_str().unwrap(), "init"]);
    let out = fx.run_ok(&["show", "feature"]);
    assert!(out.contains("Base........: main"));
    assert!(out.contains("Dependencies: (none)"));
}

#[test]
fn continue_without_operation_fails() {
    let fx = Fixture::new();
    let err = fx.run_err(&["--continue"]);
    assert!(err.contains("no operation in progress"), "{err}");
    let err = fx.run_err(&["--abort"]);
    assert!(err.contains("no operation in progress"), "{err}");
}

#[test]
fn conflicted_update_blocks_other_commands_until_aborted() {
    let fx = Fixture::new();
    git(fx.path(), &["checkout", "-q", "lib"]);
    commit_file(fx.path(), "shared.txt", "lib\n", "lib: rewrite shared");
    git(fx.path(), &["checkout", "-q", "feature"]);
    fx.run_ok(&["init", "--base", "main", "--depends-on", "lib"]);
    commit_file(fx.path(), "feature.txt", "feature\n", "feature work");
    fx.advance_main("shared.txt", "main\n");
    let head = git(fx.path(), &["rev-parse", "feature"]);

    let err = fx.run_err(&["update"]);
    assert!(err.contains("git dep --continue"), "{err}");

    let err = fx.run_err(&["status"]);
    assert!(err.contains("in progress"), "{err}");
    fx.run_err(&["--continue", "status"]);

    let out = fx.run_ok(&["--abort"]);
    assert!(out.contains("aborted"));
    assert_eq!(git(fx.path(), &["branch", "--show-current"]), "feature");
    assert_eq!(git(fx.path(), &["rev-parse", "feature"]), head);

    let out = fx.run_ok(&["status"]);
    assert!(out.contains("branch feature needs update."), "{out}");
}

#[test]
fn status_dot_lists_edges() {
    let fx = Fixture::new();
    fx.run_ok(&["init", "--base", "main", "--depends-on", "lib"]);
    fx.run_ok(&["update"]);

    let out = fx.run_ok(&["status", "--all", "--dot"]);
    assert!(out.starts_with("digraph \"regit branch dependencies\" {"));
    assert!(out.contains("\"feature\" -> \"lib\""));
}

#[test]
fn set_ref_and_rebase_tip() {
    let fx = Fixture::new();
    fx.run_ok(&["init", "--base", "main"]);

    let out = fx.run_ok(&["set-ref", "42"]);
    assert!(out.contains("External reference set to #42."));
    let out = fx.run_ok(&["show"]);
    assert!(out.contains("Branch......: feature (#42)"));

    let main = git(fx.path(), &["rev-parse", "main"]);
    let out = fx.run_ok(&["set-rebase-tip", "--base"]);
    assert!(out.contains(&main));
    fx.run_err(&["set-rebase-tip"]);
}

#[test]
fn dependency_editing_requires_operands() {
    let fx = Fixture::new();
    fx.run_ok(&["init", "--base", "main", "--depends-on", "lib"]);

    for command in ["add", "del", "set"] {
        let err = fx.run_err(&[command]);
        assert!(err.contains("required"), "{command}: {err}");
    }
    let err = fx.run_err(&["add", "regit/base/feature"]);
    assert!(err.contains("reserved branch"), "{err}");

    let out = fx.run_ok(&["set", "lib"]);
    assert!(out.contains("Dependencies: lib"), "{out}");
    let out = fx.run_ok(&["del", "lib"]);
    assert!(out.contains("Dependencies: (none)"), "{out}");
}

#[test]
fn outside_a_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_git-dep"))
        .arg("status")
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("GIT_CEILING_DIRECTORIES", dir.path())
        .output()
        .expect("run git-dep");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not a git repository"));
}
