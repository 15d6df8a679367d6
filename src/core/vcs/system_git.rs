//! System git backend
//!
//! Shells out to `git` with an isolated environment. Reviews are fetched by
//! ref from the remote and checked out detached at `FETCH_HEAD`, so the gate
//! never creates or moves local branches.

use super::{RevisionControl, RevisionId};
use crate::core::error::{GitError, GlintError, GlintResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using system git
pub struct SystemGit {
  /// Working tree root
  work_tree: PathBuf,

  /// Remote reviews and branches are fetched from
  remote: String,
}

impl SystemGit {
  /// Open a git repository, fetching from `remote` or the first configured remote
  pub fn open(path: &Path, remote: Option<&str>) -> GlintResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || stderr.contains("cannot change to") {
        return Err(GlintError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(GlintError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let work_tree = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    let mut git = Self {
      work_tree,
      remote: String::new(),
    };

    git.remote = match remote {
      Some(name) => name.to_string(),
      None => git.first_remote()?,
    };
    tracing::debug!(root = %git.work_tree.display(), remote = %git.remote, "opened repository");

    Ok(git)
  }

  /// Remote name used for fetches
  pub fn remote(&self) -> &str {
    &self.remote
  }

  fn first_remote(&self) -> GlintResult<String> {
    let output = self.run(&["remote"])?;
    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(str::trim)
      .find(|l| !l.is_empty())
      .map(str::to_string)
      .ok_or(GlintError::Git(GitError::NoRemote))
  }

  /// Fetch `target` from the remote into FETCH_HEAD
  fn fetch(&self, target: &str) -> GlintResult<()> {
    self.run(&["fetch", "--quiet", &self.remote, target])?;
    Ok(())
  }

  /// Short SHA of HEAD
  pub fn head_short(&self) -> GlintResult<String> {
    let output = self.run(&["rev-parse", "--short", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run a git command, turning a non-zero exit into `GitError::CommandFailed`
  fn run(&self, args: &[&str]) -> GlintResult<Output> {
    let command = format!("git {}", args.join(" "));
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      return Err(GlintError::Git(GitError::CommandFailed {
        command,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(output)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree
  /// - Clears environment variables
  /// - Whitelists PATH, HOME and the ssh agent socket (remote fetches)
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    cmd.env_clear();
    for var in ["PATH", "HOME", "SSH_AUTH_SOCK", "GIT_SSH_COMMAND"] {
      if let Ok(value) = std::env::var(var) {
        cmd.env(var, value);
      }
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}

impl RevisionControl for SystemGit {
  fn root(&self) -> &Path {
    &self.work_tree
  }

  fn checkout(&mut self, target: &str) -> GlintResult<RevisionId> {
    self.fetch(target)?;
    self.run(&["checkout", "--quiet", "FETCH_HEAD"])?;
    let id = self.head_short()?;
    tracing::info!(target, revision = %id, "checked out");
    Ok(RevisionId(id))
  }

  fn changed_files(&mut self, review: &str) -> GlintResult<Vec<PathBuf>> {
    self.fetch(review)?;
    let output = self.run(&["diff-tree", "--no-commit-id", "--name-only", "-r", "FETCH_HEAD"])?;
    let files: Vec<PathBuf> = parse_name_list(&String::from_utf8_lossy(&output.stdout));
    tracing::info!(review, count = files.len(), "found changed files");
    Ok(files)
  }
}

/// One path per non-empty line
fn parse_name_list(stdout: &str) -> Vec<PathBuf> {
  stdout
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(PathBuf::from)
    .collect()
}
