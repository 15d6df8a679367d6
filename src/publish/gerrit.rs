//! Post verdicts to Gerrit over its ssh command interface
//!
//! `ssh -p <port> <user>@<host> gerrit review --code-review <vote> -m <msg> <commit>`

use super::Publisher;
use crate::checks::Verdict;
use crate::core::config::GerritConfig;
use crate::core::error::{ConfigError, GlintError, GlintResult, PublishError, ResultExt};
use crate::core::vcs::RevisionId;
use std::process::Command;

/// Gerrit ssh publisher
#[derive(Debug, Clone)]
pub struct GerritPublisher {
  host: String,
  user: String,
  port: u16,
  pass_vote: i8,
  fail_vote: i8,
  /// Link to the CI console output, appended to failing reviews
  console_url: Option<String>,
}

impl GerritPublisher {
  /// Build from config; host and user are required
  pub fn from_config(config: &GerritConfig) -> GlintResult<Self> {
    let host = config.host.clone().filter(|h| !h.is_empty()).ok_or_else(|| {
      GlintError::Config(ConfigError::MissingField {
        field: "gerrit.host".to_string(),
      })
    })?;
    let user = config.user.clone().filter(|u| !u.is_empty()).ok_or_else(|| {
      GlintError::Config(ConfigError::MissingField {
        field: "gerrit.user".to_string(),
      })
    })?;

    Ok(Self {
      host,
      user,
      port: config.port,
      pass_vote: config.pass_vote,
      fail_vote: config.fail_vote,
      console_url: jenkins_console_url(),
    })
  }

  /// Code-Review vote for a verdict, formatted for the CLI (`+1`, `-1`)
  pub fn vote(&self, verdict: &Verdict) -> String {
    if verdict.success() {
      format!("{:+}", self.pass_vote)
    } else {
      format!("{:+}", self.fail_vote)
    }
  }

  /// Message body posted with the vote
  pub fn comment(&self, verdict: &Verdict) -> String {
    let mut message = verdict.message().trim_end().to_string();
    if !verdict.success()
      && let Some(url) = &self.console_url
    {
      message.push_str(&format!("\r\n\r\nCheck output here: {}", url));
    }
    message
  }

  fn command(&self, revision: &RevisionId, verdict: &Verdict) -> Command {
    let mut cmd = Command::new("ssh");
    cmd
      .arg("-p")
      .arg(self.port.to_string())
      .arg(format!("{}@{}", self.user, self.host))
      .args(["gerrit", "review", "--code-review"])
      .arg(self.vote(verdict))
      .arg("-m")
      .arg(quote_message(&self.comment(verdict)))
      .arg(&revision.0);
    cmd
  }
}

impl Publisher for GerritPublisher {
  fn publish(&self, revision: &RevisionId, verdict: &Verdict) -> GlintResult<()> {
    let vote = self.vote(verdict);
    tracing::info!(host = %self.host, revision = %revision, vote = %vote, "posting review");

    let output = self
      .command(revision, verdict)
      .output()
      .context("Failed to execute ssh")?;

    if !output.status.success() {
      return Err(GlintError::Publish(PublishError::CommandFailed {
        command: format!("ssh -p {} {}@{} gerrit review", self.port, self.user, self.host),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(())
  }
}

/// Quote a message for the remote shell and then for Gerrit
///
/// The remote side runs the command through a shell, so the text is wrapped
/// in single quotes (for the shell) around double quotes (for Gerrit's
/// argument parser).
pub fn quote_message(message: &str) -> String {
  let for_gerrit = message.replace('\\', "\\\\").replace('"', "\\\"");
  let inner = format!("\"{}\"", for_gerrit);
  format!("'{}'", inner.replace('\'', "'\\''"))
}

/// `$JENKINS_URL/job/$JOB_NAME/$BUILD_NUMBER/consoleText`, when running under Jenkins
fn jenkins_console_url() -> Option<String> {
  let base = std::env::var("JENKINS_URL").ok()?;
  let job = std::env::var("JOB_NAME").ok()?;
  let build = std::env::var("BUILD_NUMBER").ok()?;
  let base = if base.ends_with('/') { base } else { format!("{}/", base) };
  Some(format!("{}job/{}/{}/consoleText", base, job, build))
}
