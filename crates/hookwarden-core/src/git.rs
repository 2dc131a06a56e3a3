//! Working-tree measurements backed by git
//!
//! [`ChangeSource`] is the seam evaluators use to read the working tree;
//! [`GitWorkspace`] implements it by shelling out to `git` through a
//! [`ProcessRunner`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{HookError, Result};
use crate::process::{CommandSpec, ProcessRunner, TokioProcessRunner, GIT_TIMEOUT};
use crate::threshold::ChangeMetrics;

/// Maximum number of paths reported as recently modified
pub const RECENT_FILES_LIMIT: usize = 10;

/// Source of working-tree signals
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Whether the measurement mechanism can run at all
    async fn is_available(&self) -> bool;

    /// Aggregate size of uncommitted work
    async fn change_metrics(&self) -> Result<ChangeMetrics>;

    /// Paths modified relative to HEAD (staged and unstaged)
    async fn modified_files(&self) -> Result<Vec<String>>;

    /// Current branch name, if any
    async fn current_branch(&self) -> Option<String>;

    /// Paths touched by recent work, most relevant first
    async fn recent_files(&self) -> Vec<String>;
}

/// [`ChangeSource`] that queries a git working tree
#[derive(Clone)]
pub struct GitWorkspace {
    root: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for GitWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitWorkspace")
            .field("root", &self.root)
            .finish()
    }
}

impl GitWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_runner(root, Arc::new(TokioProcessRunner))
    }

    pub fn with_runner(root: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new("git")
            .args(args)
            .current_dir(&self.root)
            .timeout(GIT_TIMEOUT)
    }

    /// Run git and return stdout, treating a non-zero exit as unavailable
    async fn git_stdout<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cmd = self.git(args);
        let output = self.runner.run(&cmd).await?;
        if !output.success() {
            return Err(HookError::unavailable(format!(
                "'{}' exited with {:?}: {}",
                cmd.display(),
                output.code,
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    async fn changed_files_count(&self) -> Result<u64> {
        let stdout = self.git_stdout(["status", "--porcelain"]).await?;
        Ok(count_non_empty_lines(&stdout))
    }

    async fn changed_lines_count(&self) -> Result<u64> {
        let stdout = self.git_stdout(["diff", "--numstat"]).await?;
        Ok(parse_numstat(&stdout))
    }

    async fn untracked_lines_count(&self) -> Result<u64> {
        let stdout = self
            .git_stdout(["ls-files", "--others", "--exclude-standard", "-z"])
            .await?;
        let mut total = 0;
        for path in stdout.split('\0').filter(|p| !p.is_empty()) {
            match tokio::fs::read(self.root.join(path)).await {
                Ok(bytes) => total += count_newlines(&bytes),
                Err(e) => debug!(path, error = %e, "skipping unreadable untracked file"),
            }
        }
        Ok(total)
    }
}

#[async_trait]
impl ChangeSource for GitWorkspace {
    async fn is_available(&self) -> bool {
        match self.runner.run(&self.git(["status"])).await {
            Ok(output) => output.success(),
            Err(e) => {
                debug!(error = %e, "git is not available");
                false
            }
        }
    }

    async fn change_metrics(&self) -> Result<ChangeMetrics> {
        Ok(ChangeMetrics {
            changed_files: self.changed_files_count().await?,
            changed_lines: self.changed_lines_count().await?,
            untracked_lines: self.untracked_lines_count().await?,
        })
    }

    async fn modified_files(&self) -> Result<Vec<String>> {
        match self.git_stdout(["diff", "--name-only", "HEAD"]).await {
            Ok(stdout) => Ok(non_empty_lines(&stdout)),
            Err(e) => {
                // A repository without commits has no HEAD
                debug!(error = %e, "falling back to staged files");
                let stdout = self.git_stdout(["diff", "--cached", "--name-only"]).await?;
                Ok(non_empty_lines(&stdout))
            }
        }
    }

    async fn current_branch(&self) -> Option<String> {
        match self.git_stdout(["branch", "--show-current"]).await {
            Ok(stdout) => Some(stdout.trim().to_string()).filter(|b| !b.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read current branch");
                None
            }
        }
    }

    async fn recent_files(&self) -> Vec<String> {
        let stdout = match self.git_stdout(["diff", "--name-only", "HEAD~5"]).await {
            Ok(stdout) => stdout,
            Err(_) => match self.git_stdout(["diff", "--name-only"]).await {
                Ok(stdout) => stdout,
                Err(e) => {
                    warn!(error = %e, "could not list recent files");
                    return Vec::new();
                }
            },
        };
        let mut files = non_empty_lines(&stdout);
        files.truncate(RECENT_FILES_LIMIT);
        files
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn count_non_empty_lines(text: &str) -> u64 {
    text.lines().filter(|line| !line.trim().is_empty()).count() as u64
}

/// Sum added and deleted counts of `git diff --numstat` output
///
/// Binary files report `-` and contribute nothing.
pub fn parse_numstat(text: &str) -> u64 {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.split('\t');
            let added = parts.next().and_then(|p| p.trim().parse::<u64>().ok());
            let deleted = parts.next().and_then(|p| p.trim().parse::<u64>().ok());
            added.unwrap_or(0) + deleted.unwrap_or(0)
        })
        .sum()
}

fn count_newlines(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|b| **b == b'\n').count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockProcessRunner};

    fn ok(stdout: &str) -> Result<CommandOutput> {
        Ok(CommandOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    fn failed() -> Result<CommandOutput> {
        Ok(CommandOutput {
            code: Some(128),
            stdout: String::new(),
            stderr: "fatal: bad revision 'HEAD'".to_string(),
        })
    }

    #[test]
    fn test_parse_numstat() {
        let text = "3\t1\tsrc/a.rs\n-\t-\tlogo.png\n10\t0\tREADME.md\n";
        assert_eq!(parse_numstat(text), 14);
        assert_eq!(parse_numstat(""), 0);
    }

    #[test]
    fn test_count_helpers() {
        assert_eq!(count_non_empty_lines(" M a\n?? b\n\n"), 2);
        assert_eq!(count_newlines(b"a\nb\nc"), 2);
        assert_eq!(non_empty_lines("a\n\n b \n"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_change_metrics_from_git() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("new.txt"), "one\ntwo\nthree\n").unwrap();

        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|cmd| match cmd.args[0].as_str() {
            "status" => ok(" M src/a.rs\n?? new.txt\n"),
            "diff" => ok("4\t2\tsrc/a.rs\n"),
            "ls-files" => ok("new.txt\0missing.txt\0"),
            other => panic!("unexpected git {}", other),
        });

        let workspace = GitWorkspace::with_runner(dir.path(), Arc::new(runner));
        let metrics = workspace.change_metrics().await.unwrap();
        assert_eq!(
            metrics,
            ChangeMetrics {
                changed_files: 2,
                changed_lines: 6,
                untracked_lines: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_change_metrics_unavailable_on_git_failure() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|_| failed());
        let workspace = GitWorkspace::with_runner(".", Arc::new(runner));
        let err = workspace.change_metrics().await.unwrap_err();
        assert!(matches!(err, HookError::SignalUnavailable(_)));
    }

    #[tokio::test]
    async fn test_modified_files_falls_back_without_head() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|cmd| {
            if cmd.args.iter().any(|a| a == "HEAD") {
                failed()
            } else {
                ok("src/index.ts\n")
            }
        });
        let workspace = GitWorkspace::with_runner(".", Arc::new(runner));
        assert_eq!(workspace.modified_files().await.unwrap(), vec!["src/index.ts"]);
    }

    #[tokio::test]
    async fn test_recent_files_are_capped() {
        let listing: String = (0..15).map(|i| format!("f{}.rs\n", i)).collect();
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(move |_| ok(&listing));
        let workspace = GitWorkspace::with_runner(".", Arc::new(runner));
        assert_eq!(workspace.recent_files().await.len(), RECENT_FILES_LIMIT);
    }

    #[tokio::test]
    async fn test_unavailable_when_spawn_fails() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .returning(|_| Err(HookError::unavailable("no git")));
        let workspace = GitWorkspace::with_runner(".", Arc::new(runner));
        assert!(!workspace.is_available().await);
        assert!(workspace.current_branch().await.is_none());
    }
}
