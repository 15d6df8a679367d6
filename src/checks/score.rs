//! Score validator: a baseline score adjusted by a list of checkers

use super::checkers::{AboveScoreThreshold, AnalysisFailures, Checker, NoNewIssues};
use super::trait_def::{REJECTED_SCORE, Validator, Verdict};
use crate::core::registry::Plugin;
use crate::lint::Snapshot;
use std::sync::Arc;

/// Default acceptance threshold on pylint's 10-point scale
pub const DEFAULT_THRESHOLD: f64 = 9.0;

/// Validator that sums checker deltas onto a baseline score
///
/// Final score is `max(0, baseline + Σ delta)`, unless any checker rejects,
/// in which case it is [`REJECTED_SCORE`]. Reasons appear in checker order.
pub struct ScoreValidator {
  name: String,
  extensions: Vec<String>,
  baseline: f64,
  checkers: Vec<Arc<dyn Checker>>,
}

impl ScoreValidator {
  pub fn new(name: impl Into<String>, extensions: Vec<String>, baseline: f64) -> Self {
    Self {
      name: name.into(),
      extensions,
      baseline,
      checkers: Vec::new(),
    }
  }

  /// Append a checker
  pub fn with_checker(mut self, checker: Arc<dyn Checker>) -> Self {
    self.checkers.push(checker);
    self
  }

  /// Built-in pylint validator: no new errors, average at or above `threshold`
  pub fn pylint(threshold: f64) -> Self {
    Self::new("pylint", vec!["py".to_string()], threshold)
      .with_checker(Arc::new(NoNewIssues::default()))
      .with_checker(Arc::new(AboveScoreThreshold { threshold }))
      .with_checker(Arc::new(AnalysisFailures))
  }
}

impl Plugin for ScoreValidator {
  fn name(&self) -> &str {
    &self.name
  }

  fn file_types(&self) -> Vec<String> {
    self.extensions.clone()
  }
}

impl Validator for ScoreValidator {
  fn description(&self) -> &str {
    "Rejects new issues and scores below the threshold"
  }

  fn validate(&self, new: &Snapshot, old: &Snapshot) -> Verdict {
    let mut total = self.baseline;
    let mut rejected = false;
    let mut reasons = Vec::new();

    for checker in &self.checkers {
      let outcome = checker.check(new, old);
      tracing::debug!(
        validator = %self.name,
        checker = checker.name(),
        delta = outcome.delta,
        reject = outcome.reject,
        "checker finished"
      );
      total += outcome.delta;
      rejected |= outcome.reject;
      if let Some(reason) = outcome.reason.filter(|r| !r.is_empty()) {
        reasons.push(reason);
      }
    }

    let score = if rejected { REJECTED_SCORE } else { total.max(0.0) };

    let mut message = if rejected {
      format!("Failed {} validation!", self.name)
    } else {
      format!("Passed {} validation.", self.name)
    };
    for reason in reasons {
      message.push('\n');
      message.push_str(&reason);
    }

    Verdict::new(score, message)
  }
}
