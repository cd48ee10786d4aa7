use regit_core::constants::CHILD_ENV_MARKER;
use regit_core::error::VcsError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured result of one git invocation.
#[derive(Debug)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl GitOutput {
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

/// Runs the git binary inside a repository working tree.
#[derive(Debug, Clone)]
pub struct GitRunner {
    binary: String,
    repo_root: PathBuf,
}

impl GitRunner {
    pub fn new(binary: impl Into<String>, repo_root: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.into(),
            repo_root: repo_root.as_ref().to_path_buf(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(&self.repo_root)
            .env(CHILD_ENV_MARKER, "1")
            // Never block on an interactive editor.
            .env("GIT_EDITOR", "true");
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    /// Run git and capture its output whether or not it succeeded.
    pub fn run(&self, args: &[&str]) -> Result<GitOutput, VcsError> {
        let description = self.describe(args);
        debug!(command = %description, "running git");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| VcsError::Spawn {
                command: description.clone(),
                source,
            })?;
        let result = GitOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };
        if !result.success {
            debug!(command = %description, stderr = %result.stderr, "git exited with failure");
        }
        Ok(result)
    }

    /// Run git and fail unless it exits successfully.
    pub fn run_checked(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.run(args)?;
        if output.success {
            Ok(output.stdout_string())
        } else {
            Err(VcsError::command_failed(self.describe(args), output.stderr))
        }
    }

    /// Feed the stdout of `producer` into the stdin of `consumer`.
    ///
    /// Returns `Ok(false)` without running the consumer when the producer
    /// printed nothing.
    pub fn pipe(&self, producer: &[&str], consumer: &[&str]) -> Result<bool, VcsError> {
        let produced = self.run(producer)?;
        if !produced.success {
            return Err(VcsError::command_failed(
                self.describe(producer),
                produced.stderr,
            ));
        }
        if produced.stdout.iter().all(u8::is_ascii_whitespace) {
            debug!(command = %self.describe(producer), "nothing to apply");
            return Ok(false);
        }

        let description = self.describe(consumer);
        debug!(command = %description, bytes = produced.stdout.len(), "piping into git");
        let spawn_err = |source| VcsError::Spawn {
            command: description.clone(),
            source,
        };
        let mut child = self
            .command(consumer)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let writer = child.stdin.take().map(|mut stdin| {
            let input = produced.stdout;
            std::thread::spawn(move || stdin.write_all(&input))
        });
        let output = child.wait_with_output().map_err(spawn_err)?;
        if let Some(handle) = writer {
            // A consumer that exits early closes the pipe; its exit status
            // carries the real error.
            let _ = handle.join();
        }

        if output.status.success() {
            Ok(true)
        } else {
            Err(VcsError::command_failed(
                description,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_reports_failure_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = GitRunner::new("git", dir.path());
        let output = runner.run(&["rev-parse", "--git-dir"]).unwrap();
        assert!(!output.success);
        assert!(!output.stderr.is_empty());
    }

    #[test]
    fn run_checked_names_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let runner = GitRunner::new("git", dir.path());
        let err = runner.run_checked(&["rev-parse", "HEAD"]).unwrap_err();
        assert!(err.to_string().contains("git rev-parse HEAD"));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = GitRunner::new("definitely-not-a-git-binary", dir.path());
        let err = runner.run(&["status"]).unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }));
    }
}
