//! Validator trait abstraction
//!
//! A validator compares the snapshot of a change (`new`) against the
//! snapshot of its baseline (`old`) for one file type and produces a
//! [`Verdict`].

use crate::core::registry::Plugin;
use crate::lint::Snapshot;
use serde::Serialize;

/// Score given to a change that a checker rejected outright
pub const REJECTED_SCORE: f64 = -1.0;

/// Outcome of validating one file type (or the whole run)
///
/// `success` always equals `score >= 0`; the constructors are the only way
/// to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
  success: bool,
  score: f64,
  message: String,
}

impl Verdict {
  /// Verdict for `score`; non-negative scores pass
  pub fn new(score: f64, message: impl Into<String>) -> Self {
    Self {
      success: score >= 0.0,
      score,
      message: message.into(),
    }
  }

  /// Neutral verdict: passes with score 0 and no message
  pub fn neutral() -> Self {
    Self::new(0.0, "")
  }

  pub fn success(&self) -> bool {
    self.success
  }

  pub fn score(&self) -> f64 {
    self.score
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

/// Validator capability
///
/// Must be deterministic: the same pair of snapshots always yields the same
/// verdict, message text included.
pub trait Validator: Plugin {
  /// Human-readable description of what this validator enforces
  fn description(&self) -> &str;

  /// Compare `new` against `old`
  fn validate(&self, new: &Snapshot, old: &Snapshot) -> Verdict;
}

/// Validator used for file types nobody registered
pub struct NullValidator;

impl Plugin for NullValidator {
  fn name(&self) -> &str {
    "null"
  }

  fn file_types(&self) -> Vec<String> {
    Vec::new()
  }
}

impl Validator for NullValidator {
  fn description(&self) -> &str {
    "Accepts everything"
  }

  fn validate(&self, _new: &Snapshot, _old: &Snapshot) -> Verdict {
    Verdict::neutral()
  }
}
