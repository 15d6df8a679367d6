//! Analyzers: per-file-type lint runs over one revision of the working tree
//!
//! An analyzer turns a list of files into a [`Snapshot`]. The pipeline runs
//! the same analyzer twice (baseline, then proposal) with the same file
//! list, so snapshots from both runs share one shape and can be diffed by a
//! validator.
//!
//! - **classify**: groups changed paths by file type
//! - **pylint**: runs pylint per file and parses its text output

pub mod classify;
pub mod pylint;

use crate::core::registry::{FileType, Plugin, PluginRegistry};
use crate::ui::progress::FileProgress;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

pub use classify::{FileGroups, classify};

/// Line references inside message text, e.g. "(line 12)"
static LINE_REF_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\bline \d+\b").expect("line reference regex is valid"));

/// Message severity, from the lint message category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Convention,
  Refactor,
  Warning,
  Error,
  Fatal,
}

impl Severity {
  /// Map a pylint category letter (first char of the message id)
  pub fn from_category(c: char) -> Option<Self> {
    match c {
      'I' => Some(Severity::Info),
      'C' => Some(Severity::Convention),
      'R' => Some(Severity::Refactor),
      'W' => Some(Severity::Warning),
      'E' => Some(Severity::Error),
      'F' => Some(Severity::Fatal),
      _ => None,
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Severity::Info => "info",
      Severity::Convention => "convention",
      Severity::Refactor => "refactor",
      Severity::Warning => "warning",
      Severity::Error => "error",
      Severity::Fatal => "fatal",
    };
    write!(f, "{}", s)
  }
}

/// A single lint message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintMessage {
  pub line: u32,
  pub column: u32,
  /// Message id, e.g. `E0602`
  pub code: String,
  /// Symbolic name, e.g. `undefined-variable`
  pub symbol: String,
  pub text: String,
  pub severity: Severity,
}

impl LintMessage {
  /// Message text with line references masked, so an issue that only moved
  /// keeps the same identity
  pub fn issue_text(&self) -> String {
    LINE_REF_RE.replace_all(&self.text, "line _").into_owned()
  }
}

/// Analysis of one file at one revision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
  pub messages: Vec<LintMessage>,
  /// Tool-reported score out of 10
  #[serde(skip_serializing_if = "Option::is_none")]
  pub score: Option<f64>,
  /// Set when the tool could not analyze this file
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failure: Option<String>,
}

impl FileAnalysis {
  /// Entry recording that the tool failed on this file
  pub fn failed(reason: impl Into<String>) -> Self {
    Self {
      failure: Some(reason.into()),
      ..Self::default()
    }
  }
}

/// Identity of an issue across revisions
///
/// Line numbers are left out on purpose: an edit above a defect moves it
/// without making it new.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IssueKey {
  pub path: String,
  pub code: String,
  pub text: String,
}

/// Result of analyzing a file set at one revision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  /// Per-file results, keyed by repository-relative path
  pub files: BTreeMap<String, FileAnalysis>,
  /// Number of messages across all files
  pub total: usize,
  /// Number of error-severity messages
  pub errors: usize,
  /// Mean of per-file scores; `None` when no file was scored
  pub average: Option<f64>,
}

impl Snapshot {
  /// Insert a file result and keep the aggregate fields in step
  pub fn record(&mut self, path: impl Into<String>, analysis: FileAnalysis) {
    self.files.insert(path.into(), analysis);
    self.recompute();
  }

  fn recompute(&mut self) {
    self.total = self.files.values().map(|f| f.messages.len()).sum();
    self.errors = self
      .files
      .values()
      .flat_map(|f| &f.messages)
      .filter(|m| m.severity == Severity::Error)
      .count();

    let scores: Vec<f64> = self.files.values().filter_map(|f| f.score).collect();
    self.average = if scores.is_empty() {
      None
    } else {
      Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };
  }

  /// Whether no file has been recorded
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Messages at or above `min`, with their file path, in path order
  pub fn issues(&self, min: Severity) -> impl Iterator<Item = (&str, &LintMessage)> {
    self
      .files
      .iter()
      .flat_map(|(path, f)| f.messages.iter().map(move |m| (path.as_str(), m)))
      .filter(move |(_, m)| m.severity >= min)
  }

  /// Count of each issue at or above `min`
  pub fn issue_counts(&self, min: Severity) -> BTreeMap<IssueKey, usize> {
    let mut counts = BTreeMap::new();
    for (path, msg) in self.issues(min) {
      let key = IssueKey {
        path: path.to_string(),
        code: msg.code.clone(),
        text: msg.issue_text(),
      };
      *counts.entry(key).or_insert(0) += 1;
    }
    counts
  }

  /// Files whose analysis failed, with the reason
  pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .files
      .iter()
      .filter_map(|(path, f)| f.failure.as_deref().map(|reason| (path.as_str(), reason)))
  }
}

/// Snapshots for one revision, keyed by file type
pub type SnapshotSet = BTreeMap<FileType, Snapshot>;

/// Inputs shared by every analyzer call in a phase
pub struct AnalysisContext<'a> {
  /// Working tree root; files are relative to it
  pub root: &'a Path,
  /// Ticked once per file when present
  pub progress: Option<&'a FileProgress>,
}

impl<'a> AnalysisContext<'a> {
  pub fn new(root: &'a Path) -> Self {
    Self { root, progress: None }
  }

  pub fn with_progress(mut self, progress: &'a FileProgress) -> Self {
    self.progress = Some(progress);
    self
  }

  pub(crate) fn tick(&self) {
    if let Some(progress) = self.progress {
      progress.inc();
    }
  }
}

/// Analyzer capability
///
/// Must be callable once per revision with the same file list. Failures of
/// the underlying tool for one file are recorded in the snapshot
/// ([`FileAnalysis::failed`]) rather than returned, so one bad file never
/// hides the results for the rest.
pub trait Analyzer: Plugin {
  /// Human-readable description of what this analyzer runs
  fn description(&self) -> &str;

  /// Analyze `files` in the current working tree
  fn run(&self, files: &[PathBuf], ctx: &AnalysisContext) -> Snapshot;
}

/// Analyzer used for file types nobody registered
pub struct NullAnalyzer;

impl Plugin for NullAnalyzer {
  fn name(&self) -> &str {
    "null"
  }

  fn file_types(&self) -> Vec<String> {
    Vec::new()
  }
}

impl Analyzer for NullAnalyzer {
  fn description(&self) -> &str {
    "Ignores files it is given"
  }

  fn run(&self, _files: &[PathBuf], _ctx: &AnalysisContext) -> Snapshot {
    Snapshot::default()
  }
}

/// File type → analyzer
pub type AnalyzerRegistry = PluginRegistry<dyn Analyzer>;

/// Registry with built-in analyzers (pylint for `py`)
pub fn default_analyzers() -> AnalyzerRegistry {
  let mut registry = AnalyzerRegistry::new(Arc::new(NullAnalyzer));
  // built-ins are known-good; a failure here is a programming error caught by tests
  if let Err(err) = registry.register(Arc::new(pylint::PylintAnalyzer::default())) {
    tracing::error!("built-in analyzer rejected: {}", err);
  }
  registry
}
