//! Checkers: single comparison rules composed by a validator
//!
//! Each checker looks at the new and old snapshots and returns a score
//! delta, an optional reason line, and whether it rejects the change
//! outright. Rejection is separate from the delta so a "new defect" rule can
//! fail a change no matter how good its score is.

use crate::lint::{Severity, Snapshot};
use std::fmt::Write as _;

/// What one checker concluded
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
  pub delta: f64,
  pub reason: Option<String>,
  pub reject: bool,
}

impl CheckOutcome {
  /// No opinion: zero delta, no reason
  pub fn pass() -> Self {
    Self {
      delta: 0.0,
      reason: None,
      reject: false,
    }
  }

  /// Hard failure with a reason
  pub fn reject(delta: f64, reason: impl Into<String>) -> Self {
    Self {
      delta,
      reason: Some(reason.into()),
      reject: true,
    }
  }

  /// Informational note that does not affect the score
  pub fn note(reason: impl Into<String>) -> Self {
    Self {
      delta: 0.0,
      reason: Some(reason.into()),
      reject: false,
    }
  }
}

/// A single comparison rule
pub trait Checker: Send + Sync {
  /// Name used in config `checks = [...]`
  fn name(&self) -> &str;

  fn check(&self, new: &Snapshot, old: &Snapshot) -> CheckOutcome;
}

/// Rejects any issue that appears more often in `new` than in `old`
pub struct NoNewIssues {
  pub min_severity: Severity,
}

impl Default for NoNewIssues {
  fn default() -> Self {
    Self {
      min_severity: Severity::Error,
    }
  }
}

impl Checker for NoNewIssues {
  fn name(&self) -> &str {
    "no-new-issues"
  }

  fn check(&self, new: &Snapshot, old: &Snapshot) -> CheckOutcome {
    let old_counts = old.issue_counts(self.min_severity);
    let new_counts = new.issue_counts(self.min_severity);

    let mut introduced = Vec::new();
    for (key, &count) in &new_counts {
      let before = old_counts.get(key).copied().unwrap_or(0);
      if count <= before {
        continue;
      }
      // report the occurrences past the baseline count, by line
      let mut lines: Vec<_> = new
        .issues(self.min_severity)
        .filter(|(path, m)| *path == key.path && m.code == key.code && m.issue_text() == key.text)
        .map(|(_, m)| m)
        .collect();
      lines.sort_by_key(|m| m.line);
      introduced.extend(lines.into_iter().skip(before).map(|m| (key.path.as_str(), m)));
    }

    if introduced.is_empty() {
      return CheckOutcome::pass();
    }

    introduced.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| a.code.cmp(&b.code)).then(a.line.cmp(&b.line)));

    let mut reason = format!("{} new {} issue(s) introduced:", introduced.len(), self.min_severity);
    for (path, m) in introduced {
      let _ = write!(reason, "\n  {}:{}: {} ({}) {}", path, m.line, m.code, m.symbol, m.text);
    }
    CheckOutcome::reject(super::REJECTED_SCORE, reason)
  }
}

/// Rejects when the new average score falls below a threshold
pub struct AboveScoreThreshold {
  pub threshold: f64,
}

impl Checker for AboveScoreThreshold {
  fn name(&self) -> &str {
    "above-score-threshold"
  }

  fn check(&self, new: &Snapshot, _old: &Snapshot) -> CheckOutcome {
    // no scored files (all new, or none analyzed) is treated as on-threshold
    let Some(score) = new.average else {
      return CheckOutcome::pass();
    };

    if score >= self.threshold {
      return CheckOutcome::pass();
    }

    let delta = score - self.threshold;
    CheckOutcome::reject(
      delta,
      format!(
        "Average score {:.2} is below the threshold of {:.2} (short by {:.2})",
        score, self.threshold, -delta
      ),
    )
  }
}

/// Lists files the analyzer could not process in the new revision
pub struct AnalysisFailures;

impl Checker for AnalysisFailures {
  fn name(&self) -> &str {
    "analysis-failures"
  }

  fn check(&self, new: &Snapshot, _old: &Snapshot) -> CheckOutcome {
    let failures: Vec<_> = new.failures().collect();
    if failures.is_empty() {
      return CheckOutcome::pass();
    }

    let mut reason = format!("{} file(s) could not be analyzed:", failures.len());
    for (path, why) in failures {
      let _ = write!(reason, "\n  {}: {}", path, why);
    }
    CheckOutcome::note(reason)
  }
}
