//! `glint check`: gate a review against its baseline branch

use crate::core::config::GlintConfig;
use crate::core::error::{ConfigError, ExitCode, GlintError, GlintResult};
use crate::core::vcs::SystemGit;
use crate::pipeline::{Pipeline, ReviewRequest};
use crate::publish::{DryRunPublisher, GerritPublisher, Publisher};
use crate::report::{JsonReport, render_run};
use std::path::PathBuf;

/// Gerrit change refs live under this namespace
const CHANGE_REF_PREFIX: &str = "refs/changes/";

/// Flags for `glint check`, after clap has folded in environment variables
#[derive(Debug, Default)]
pub struct CheckOptions {
  pub review_id: Option<String>,
  pub target: Option<String>,
  pub branch: Option<String>,
  pub repo: Option<PathBuf>,
  pub user: Option<String>,
  pub host: Option<String>,
  pub port: Option<u16>,
  pub remote: Option<String>,
  pub config: Option<PathBuf>,
  pub no_publish: bool,
  pub json: bool,
}

/// Run the check command; returns the exit code for the verdict
pub fn run_check(opts: CheckOptions) -> GlintResult<ExitCode> {
  let review = resolve_review(
    opts.review_id.as_deref(),
    opts.target.as_deref(),
    std::env::var("GERRIT_REFSPEC").ok().as_deref(),
  )?;

  let repo = match &opts.repo {
    Some(path) => path.clone(),
    None => std::env::current_dir()?,
  };

  let mut config = GlintConfig::load(&repo, opts.config.as_deref())?;
  apply_overrides(&mut config, &opts);
  config.validate()?;

  let analyzers = config.analyzers()?;
  let validators = config.validators()?;

  // resolve the publisher before touching the working tree
  let publisher: Box<dyn Publisher> = if opts.no_publish {
    Box::new(DryRunPublisher)
  } else {
    Box::new(GerritPublisher::from_config(&config.gerrit)?)
  };

  let mut vcs = SystemGit::open(&repo, config.gate.remote.as_deref())?;
  let request = ReviewRequest {
    base: config.gate.branch.clone(),
    review,
  };
  tracing::info!(base = %request.base, review = %request.review, remote = vcs.remote(), "starting gate");

  let run = Pipeline::new(&analyzers, &validators)
    .with_progress(!opts.json)
    .run(&mut vcs, publisher.as_ref(), &request)?;

  if opts.json {
    println!("{}", serde_json::to_string_pretty(&JsonReport::new(&run))?);
  } else {
    print!("{}", render_run(&run));
  }

  Ok(if run.verdict.success() {
    ExitCode::Passed
  } else {
    ExitCode::Rejected
  })
}

/// CLI and environment values win over the config file
fn apply_overrides(config: &mut GlintConfig, opts: &CheckOptions) {
  if let Some(branch) = &opts.branch {
    config.gate.branch = branch.clone();
  }
  if let Some(remote) = &opts.remote {
    config.gate.remote = Some(remote.clone());
  }
  if let Some(host) = &opts.host {
    config.gerrit.host = Some(host.clone());
  }
  if let Some(user) = &opts.user {
    config.gerrit.user = Some(user.clone());
  }
  if let Some(port) = opts.port {
    config.gerrit.port = port;
  }
}

/// Pick the ref under review
///
/// `--review-id 99/299/3` becomes `refs/changes/99/299/3`; `--target` is
/// used as given; otherwise the `GERRIT_REFSPEC` a Gerrit trigger exports.
pub fn resolve_review(review_id: Option<&str>, target: Option<&str>, env_refspec: Option<&str>) -> GlintResult<String> {
  if let Some(id) = review_id.map(str::trim).filter(|s| !s.is_empty()) {
    let id = id.strip_prefix(CHANGE_REF_PREFIX).unwrap_or(id);
    return Ok(format!("{}{}", CHANGE_REF_PREFIX, id.trim_start_matches('/')));
  }

  target
    .or(env_refspec)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .ok_or_else(|| {
      GlintError::Config(ConfigError::MissingField {
        field: "review".to_string(),
      })
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_review_id_is_prefixed() {
    assert_eq!(
      resolve_review(Some("99/299/3"), None, None).unwrap(),
      "refs/changes/99/299/3"
    );
    assert_eq!(
      resolve_review(Some("/99/299/3"), None, None).unwrap(),
      "refs/changes/99/299/3"
    );
    assert_eq!(
      resolve_review(Some("refs/changes/99/299/3"), None, None).unwrap(),
      "refs/changes/99/299/3"
    );
  }

  #[test]
  fn test_review_id_beats_env() {
    assert_eq!(
      resolve_review(Some("1/1/1"), None, Some("refs/changes/2/2/2")).unwrap(),
      "refs/changes/1/1/1"
    );
  }

  #[test]
  fn test_target_then_env() {
    assert_eq!(resolve_review(None, Some("feature"), Some("x")).unwrap(), "feature");
    assert_eq!(
      resolve_review(None, None, Some("refs/changes/2/2/2")).unwrap(),
      "refs/changes/2/2/2"
    );
  }

  #[test]
  fn test_missing_review_is_config_error() {
    let err = resolve_review(None, None, Some("  ")).unwrap_err();
    assert!(matches!(err, GlintError::Config(ConfigError::MissingField { .. })));
    assert_eq!(err.exit_code(), ExitCode::User);
  }

  #[test]
  fn test_overrides_beat_config() {
    let mut config = GlintConfig::default();
    config.gerrit.host = Some("from-config".to_string());
    let opts = CheckOptions {
      branch: Some("main".to_string()),
      host: Some("from-cli".to_string()),
      port: Some(2222),
      ..Default::default()
    };
    apply_overrides(&mut config, &opts);

    assert_eq!(config.gate.branch, "main");
    assert_eq!(config.gerrit.host.as_deref(), Some("from-cli"));
    assert_eq!(config.gerrit.port, 2222);
    assert_eq!(config.gerrit.user, None);
  }
}
