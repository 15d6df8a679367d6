//! Validators: turn a (new, old) snapshot pair into a verdict
//!
//! Every validator implements [`Validator`] and is routed by file type
//! through a [`ValidatorRegistry`]. File types without a validator resolve
//! to [`NullValidator`], which always returns a neutral verdict.
//!
//! # Built-in Validators
//!
//! - **pylint** ([`ScoreValidator`]): no new errors, average score at or
//!   above the threshold, plus a note for files that could not be analyzed

pub mod checkers;
mod score;
mod trait_def;

use crate::core::registry::PluginRegistry;
use std::sync::Arc;

pub use score::{DEFAULT_THRESHOLD, ScoreValidator};
pub use trait_def::{NullValidator, REJECTED_SCORE, Validator, Verdict};

/// File type → validator
pub type ValidatorRegistry = PluginRegistry<dyn Validator>;

/// Registry with built-in validators, using `threshold` for pylint
pub fn default_validators(threshold: f64) -> ValidatorRegistry {
  let mut registry = ValidatorRegistry::new(Arc::new(NullValidator));
  if let Err(err) = registry.register(Arc::new(ScoreValidator::pylint(threshold))) {
    tracing::error!("built-in validator rejected: {}", err);
  }
  registry
}
