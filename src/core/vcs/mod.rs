pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::GlintResult;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of the commit a checkout left the working tree at
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct RevisionId(pub String);

impl fmt::Display for RevisionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Working-tree control the gate needs from version control
///
/// Only one revision is materialized at a time, which is why the pipeline
/// analyzes the baseline and the proposal strictly one after the other.
pub trait RevisionControl {
  /// Working tree root; changed files are relative to it
  fn root(&self) -> &Path;

  /// Materialize `target` (branch, ref or commit) in the working tree
  fn checkout(&mut self, target: &str) -> GlintResult<RevisionId>;

  /// Files changed by `review` relative to the current HEAD
  fn changed_files(&mut self, review: &str) -> GlintResult<Vec<PathBuf>>;
}
