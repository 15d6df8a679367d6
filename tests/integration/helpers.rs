//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for pylint
///
/// Reports E0602 for every line mentioning `UNDEFINED` and rates the file at
/// the value of a `# score: N` comment (10.00 when absent). A file containing
/// `USAGE_ERROR` makes it exit with pylint's usage-error bit.
const FAKE_PYLINT: &str = r#"#!/bin/sh
for last; do :; done
file="$last"
if grep -q 'USAGE_ERROR' "$file"; then
  echo "usage: pylint [options]" >&2
  exit 32
fi
echo "************* Module fake"
grep -n 'UNDEFINED' "$file" | while IFS=: read -r n _; do
  echo "$n:0:E0602:undefined-variable:Undefined variable 'UNDEFINED'"
done
score=$(sed -n 's/^# score: //p' "$file")
echo ""
echo "Your code has been rated at ${score:-10.00}/10"
exit 0
"#;

/// An origin repository, a clone to gate in, and a glint config using the fake pylint
pub struct GateFixture {
  _root: TempDir,
  pub origin: PathBuf,
  pub clone: PathBuf,
  pub config: PathBuf,
}

impl GateFixture {
  /// Origin with `development` holding `files`, cloned next to it
  pub fn new(files: &[(&str, &str)]) -> Result<Self> {
    let root = TempDir::new()?;
    let origin = root.path().join("origin");
    let clone = root.path().join("clone");
    std::fs::create_dir_all(&origin)?;

    git(&origin, &["init", "--initial-branch=development"])?;
    git(&origin, &["config", "user.name", "Test User"])?;
    git(&origin, &["config", "user.email", "test@example.com"])?;
    write_files(&origin, files)?;
    git(&origin, &["add", "."])?;
    git(&origin, &["commit", "-m", "Baseline"])?;

    git(
      root.path(),
      &["clone", origin.to_str().context("utf-8 path")?, clone.to_str().context("utf-8 path")?],
    )?;

    let script = root.path().join("fake-pylint");
    std::fs::write(&script, FAKE_PYLINT)?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;

    let config = root.path().join("glint.toml");
    std::fs::write(
      &config,
      format!(
        r#"[[analyzers]]
name = "fake-pylint"
extensions = ["py"]
program = "{}"
args = []
"#,
        script.display()
      ),
    )?;

    Ok(Self {
      _root: root,
      origin,
      clone,
      config,
    })
  }

  /// Commit `files` on a new origin branch off `development`; returns the branch name
  pub fn push_review(&self, branch: &str, files: &[(&str, &str)]) -> Result<String> {
    git(&self.origin, &["checkout", "-b", branch, "development"])?;
    write_files(&self.origin, files)?;
    git(&self.origin, &["add", "."])?;
    git(&self.origin, &["commit", "-m", &format!("Review {}", branch)])?;
    git(&self.origin, &["checkout", "development"])?;
    Ok(branch.to_string())
  }

  /// `glint check --target <review> --no-publish` in the clone
  pub fn check(&self, review: &str, extra: &[&str]) -> Result<Output> {
    let config = self.config.to_str().context("utf-8 path")?;
    let mut args = vec!["check", "--target", review, "--no-publish", "--config", config];
    args.extend_from_slice(extra);
    run_glint(&self.clone, &args)
  }
}

fn write_files(dir: &Path, files: &[(&str, &str)]) -> Result<()> {
  for (path, content) in files {
    let full = dir.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
  }
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the glint binary; a non-zero exit is returned, not raised
pub fn run_glint(cwd: &Path, args: &[&str]) -> Result<Output> {
  let glint_bin = env!("CARGO_BIN_EXE_glint");

  Command::new(glint_bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("GERRIT_REFSPEC")
    .env_remove("GERRIT_BRANCH")
    .env_remove("GERRIT_HOST")
    .env_remove("GERRIT_PORT")
    .env_remove("GLINT_LOG")
    .output()
    .context("Failed to run glint")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
