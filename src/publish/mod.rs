//! Verdict publishing
//!
//! The pipeline hands the final verdict to a [`Publisher`] exactly once, and
//! only after a complete run. Transport, credentials and quoting belong to
//! the publisher.

pub mod gerrit;

use crate::checks::Verdict;
use crate::core::error::GlintResult;
use crate::core::vcs::RevisionId;

pub use gerrit::GerritPublisher;

/// Destination for the final verdict of a run
pub trait Publisher {
  fn publish(&self, revision: &RevisionId, verdict: &Verdict) -> GlintResult<()>;
}

/// Publisher for `--no-publish`: logs instead of posting
pub struct DryRunPublisher;

impl Publisher for DryRunPublisher {
  fn publish(&self, revision: &RevisionId, verdict: &Verdict) -> GlintResult<()> {
    tracing::info!(
      revision = %revision,
      score = verdict.score(),
      success = verdict.success(),
      "dry run, verdict not published"
    );
    Ok(())
  }
}
