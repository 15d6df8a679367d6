//! Pylint analyzer
//!
//! Runs pylint once per file with a fixed message template so the output can
//! be parsed without depending on pylint's default text layout, which has
//! changed between releases.

use super::{AnalysisContext, Analyzer, FileAnalysis, LintMessage, Severity, Snapshot};
use crate::core::registry::Plugin;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;

/// Template passed to pylint; `parse_output` depends on it
const MSG_TEMPLATE: &str = "{line}:{column}:{msg_id}:{symbol}:{msg}";

/// Pylint exit status bit for "usage error" (bad options, unreadable rcfile)
const USAGE_ERROR_BIT: i32 = 32;

static MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(\d+):(\d+):([A-Z]\d{4}):([\w-]*):(.*)$").expect("message regex is valid")
});

static SCORE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"rated at (-?\d+(?:\.\d+)?)/10").expect("score regex is valid"));

/// Analyzer that shells out to pylint (or a pylint-compatible program)
#[derive(Debug, Clone)]
pub struct PylintAnalyzer {
  name: String,
  extensions: Vec<String>,
  program: String,
  args: Vec<String>,
}

impl Default for PylintAnalyzer {
  fn default() -> Self {
    Self {
      name: "pylint".to_string(),
      extensions: vec!["py".to_string()],
      program: "pylint".to_string(),
      args: vec!["--confidence=HIGH".to_string()],
    }
  }
}

impl PylintAnalyzer {
  pub fn new(name: impl Into<String>, extensions: Vec<String>, program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      name: name.into(),
      extensions,
      program: program.into(),
      args,
    }
  }

  fn command(&self, root: &Path, file: &Path) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd
      .current_dir(root)
      .arg(format!("--msg-template={}", MSG_TEMPLATE))
      .arg("--score=y")
      .arg("--reports=n")
      .args(&self.args)
      .arg("--")
      .arg(file);
    cmd
  }

  fn analyze_file(&self, root: &Path, file: &Path) -> FileAnalysis {
    match self.command(root, file).output() {
      Ok(output) => interpret(&output),
      Err(err) => FileAnalysis::failed(format!("failed to run {}: {}", self.program, err)),
    }
  }
}

impl Plugin for PylintAnalyzer {
  fn name(&self) -> &str {
    &self.name
  }

  fn file_types(&self) -> Vec<String> {
    self.extensions.clone()
  }
}

impl Analyzer for PylintAnalyzer {
  fn description(&self) -> &str {
    "Runs pylint on each file and records messages and score"
  }

  fn run(&self, files: &[PathBuf], ctx: &AnalysisContext) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for file in files {
      ctx.tick();
      let key = file.to_string_lossy().replace('\\', "/");

      // added or deleted in this revision
      if !ctx.root.join(file).is_file() {
        tracing::debug!(file = %key, "not present in this revision, skipping");
        continue;
      }

      let analysis = self.analyze_file(ctx.root, file);
      match &analysis.failure {
        Some(reason) => tracing::warn!(file = %key, "{} failed: {}", self.name, reason),
        None => tracing::debug!(
          file = %key,
          messages = analysis.messages.len(),
          score = ?analysis.score,
          "analyzed"
        ),
      }
      snapshot.record(key, analysis);
    }

    tracing::info!(
      analyzer = %self.name,
      total = snapshot.total,
      errors = snapshot.errors,
      average = ?snapshot.average,
      "analysis complete"
    );
    snapshot
  }
}

/// Turn a finished pylint process into a file result
fn interpret(output: &Output) -> FileAnalysis {
  let Some(code) = output.status.code() else {
    return FileAnalysis::failed("pylint was terminated by a signal");
  };

  if code & USAGE_ERROR_BIT != 0 {
    return FileAnalysis::failed(format!("pylint usage error (exit {}): {}", code, first_stderr_line(output)));
  }

  let stdout = String::from_utf8_lossy(&output.stdout);
  let (messages, fatal) = parse_output(&stdout);
  let score = parse_score(&stdout);

  // fatal-only output means the file was never really analyzed
  if score.is_none()
    && messages.is_empty()
    && let Some(first) = fatal.first()
  {
    return FileAnalysis::failed(format!("pylint fatal {}: {}", first.code, first.text));
  }

  // a crash exits non-zero with a traceback on stderr and nothing on stdout
  if code != 0 && score.is_none() && messages.is_empty() {
    return FileAnalysis::failed(format!("pylint exited with {}: {}", code, first_stderr_line(output)));
  }

  FileAnalysis {
    messages,
    score,
    failure: None,
  }
}

fn first_stderr_line(output: &Output) -> String {
  let stderr = String::from_utf8_lossy(&output.stderr);
  stderr
    .lines()
    .map(str::trim)
    .find(|l| !l.is_empty())
    .unwrap_or("no details")
    .to_string()
}

/// Parse template-formatted lines into (kept messages, fatal messages)
///
/// Lines that do not follow the template (module headers, separators, the
/// score line) are ignored.
pub fn parse_output(stdout: &str) -> (Vec<LintMessage>, Vec<LintMessage>) {
  let mut kept = Vec::new();
  let mut fatal = Vec::new();

  for line in stdout.lines() {
    let Some(caps) = MESSAGE_RE.captures(line.trim_end()) else {
      continue;
    };
    let code = caps[3].to_string();
    let Some(severity) = code.chars().next().and_then(Severity::from_category) else {
      continue;
    };

    let message = LintMessage {
      line: caps[1].parse().unwrap_or(0),
      column: caps[2].parse().unwrap_or(0),
      code,
      symbol: caps[4].to_string(),
      text: caps[5].trim().to_string(),
      severity,
    };

    if severity == Severity::Fatal {
      fatal.push(message);
    } else {
      kept.push(message);
    }
  }

  (kept, fatal)
}

/// Extract "Your code has been rated at X/10"
pub fn parse_score(stdout: &str) -> Option<f64> {
  SCORE_RE.captures(stdout).and_then(|caps| caps[1].parse().ok())
}
