//! Gate pipeline
//!
//! One run walks a fixed sequence of stages and stops at the first fatal
//! error:
//!
//! ```text
//! INIT → CHECKOUT_BASE → CLASSIFY → ANALYZE_OLD → CHECKOUT_TARGET
//!      → ANALYZE_NEW → VALIDATE_ALL → AGGREGATE → REPORT → DONE
//! ```
//!
//! Execution is strictly sequential: the working tree holds one revision at
//! a time, so the two analysis phases are serialized by the checkout
//! between them. A fatal error returns before REPORT, so nothing is ever
//! published for a run that did not finish.

use crate::checks::{ValidatorRegistry, Verdict};
use crate::core::error::{GlintResult, ResultExt};
use crate::core::registry::FileType;
use crate::core::vcs::{RevisionControl, RevisionId};
use crate::lint::{AnalysisContext, AnalyzerRegistry, FileGroups, Snapshot, SnapshotSet, classify};
use crate::publish::Publisher;
use crate::ui::progress::FileProgress;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Init,
  CheckoutBase,
  Classify,
  AnalyzeOld,
  CheckoutTarget,
  AnalyzeNew,
  ValidateAll,
  Aggregate,
  Report,
  Done,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Stage::Init => "init",
      Stage::CheckoutBase => "checkout-base",
      Stage::Classify => "classify",
      Stage::AnalyzeOld => "analyze-old",
      Stage::CheckoutTarget => "checkout-target",
      Stage::AnalyzeNew => "analyze-new",
      Stage::ValidateAll => "validate-all",
      Stage::Aggregate => "aggregate",
      Stage::Report => "report",
      Stage::Done => "done",
    };
    write!(f, "{}", s)
  }
}

/// What to compare
#[derive(Debug, Clone)]
pub struct ReviewRequest {
  /// Baseline branch or ref
  pub base: String,
  /// Review ref (e.g. `refs/changes/99/299/3`)
  pub review: String,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct PipelineRun {
  /// Commit the review checkout landed on
  pub revision: RevisionId,
  pub files: FileGroups,
  pub old: SnapshotSet,
  pub new: SnapshotSet,
  /// Per file type, in key order
  pub verdicts: BTreeMap<FileType, Verdict>,
  pub verdict: Verdict,
}

/// Orchestrates one gate run over injected registries
pub struct Pipeline<'a> {
  analyzers: &'a AnalyzerRegistry,
  validators: &'a ValidatorRegistry,
  stage: Stage,
  progress: bool,
}

impl<'a> Pipeline<'a> {
  pub fn new(analyzers: &'a AnalyzerRegistry, validators: &'a ValidatorRegistry) -> Self {
    Self {
      analyzers,
      validators,
      stage: Stage::Init,
      progress: false,
    }
  }

  /// Draw per-file progress bars when stderr is a terminal
  pub fn with_progress(mut self, enabled: bool) -> Self {
    self.progress = enabled;
    self
  }

  /// Stage the pipeline is in (or stopped in, after a fatal error)
  pub fn stage(&self) -> Stage {
    self.stage
  }

  fn enter(&mut self, stage: Stage) {
    tracing::debug!(from = %self.stage, to = %stage, "pipeline stage");
    self.stage = stage;
  }

  /// Run the gate and publish the verdict
  pub fn run(
    &mut self,
    vcs: &mut dyn RevisionControl,
    publisher: &dyn Publisher,
    request: &ReviewRequest,
  ) -> GlintResult<PipelineRun> {
    self.enter(Stage::CheckoutBase);
    vcs
      .checkout(&request.base)
      .with_context(|| format!("stage {}: checking out baseline '{}'", self.stage, request.base))?;
    let changed = vcs
      .changed_files(&request.review)
      .with_context(|| format!("stage {}: listing files changed by '{}'", self.stage, request.review))?;
    // listing fetched the review; re-affirm the baseline in the working tree
    vcs
      .checkout(&request.base)
      .with_context(|| format!("stage {}: checking out baseline '{}'", self.stage, request.base))?;

    self.enter(Stage::Classify);
    let files = classify(&changed);
    tracing::info!(files = changed.len(), types = files.len(), "classified changed files");

    self.enter(Stage::AnalyzeOld);
    let old = self.analyze(&files, vcs.root(), "baseline");

    self.enter(Stage::CheckoutTarget);
    let revision = vcs
      .checkout(&request.review)
      .with_context(|| format!("stage {}: checking out review '{}'", self.stage, request.review))?;

    self.enter(Stage::AnalyzeNew);
    let new = self.analyze(&files, vcs.root(), "review");

    self.enter(Stage::ValidateAll);
    let verdicts = self.validate(&new, &old);

    self.enter(Stage::Aggregate);
    let verdict = aggregate(&verdicts);
    tracing::info!(score = verdict.score(), success = verdict.success(), "aggregated verdict");

    self.enter(Stage::Report);
    publisher.publish(&revision, &verdict)?;

    self.enter(Stage::Done);
    Ok(PipelineRun {
      revision,
      files,
      old,
      new,
      verdicts,
      verdict,
    })
  }

  /// Run the analyzer for each non-empty file group
  pub fn analyze(&self, files: &FileGroups, root: &Path, label: &str) -> SnapshotSet {
    let total = self.progress_total(files);
    let progress = if self.progress {
      FileProgress::for_terminal(total, format!("Analyzing {}", label))
    } else {
      None
    };

    let mut snapshots = SnapshotSet::new();
    for (file_type, group) in files {
      if group.is_empty() {
        continue;
      }
      let analyzer = self.analyzers.get(file_type);
      tracing::debug!(file_type = %file_type, analyzer = analyzer.name(), files = group.len(), "analyzing");

      let mut ctx = AnalysisContext::new(root);
      if let Some(progress) = &progress {
        ctx = ctx.with_progress(progress);
      }
      snapshots.insert(file_type.clone(), analyzer.run(group, &ctx));
    }
    snapshots
  }

  /// Files a registered analyzer will tick through; the null analyzer never does
  fn progress_total(&self, files: &FileGroups) -> usize {
    files
      .iter()
      .filter(|(file_type, _)| self.analyzers.contains(file_type))
      .map(|(_, group)| group.len())
      .sum()
  }

  /// Validate every file type present in `new`; missing baselines are empty
  pub fn validate(&self, new: &SnapshotSet, old: &SnapshotSet) -> BTreeMap<FileType, Verdict> {
    let empty = Snapshot::default();
    new
      .iter()
      .map(|(file_type, new_snapshot)| {
        let old_snapshot = old.get(file_type).unwrap_or(&empty);
        let validator = self.validators.get(file_type);
        let verdict = validator.validate(new_snapshot, old_snapshot);
        tracing::debug!(
          file_type = %file_type,
          validator = validator.name(),
          score = verdict.score(),
          "validated"
        );
        (file_type.clone(), verdict)
      })
      .collect()
  }
}

/// Reduce per-type verdicts to one
///
/// The lowest score wins; messages are joined in file-type order, each on
/// its own line(s). No verdicts (nothing changed) is a neutral pass.
pub fn aggregate(verdicts: &BTreeMap<FileType, Verdict>) -> Verdict {
  let Some(score) = verdicts.values().map(Verdict::score).reduce(f64::min) else {
    return Verdict::neutral();
  };

  let mut message = String::new();
  for verdict in verdicts.values() {
    let text = verdict.message();
    if text.is_empty() {
      continue;
    }
    message.push_str(text);
    if !text.ends_with('\n') {
      message.push('\n');
    }
  }

  Verdict::new(score, message)
}
