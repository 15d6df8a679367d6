//! Tests for the `check` command

use crate::helpers::*;
use anyhow::Result;

const BASE_APP: &str = "x = 1\n# score: 9.50\n";

fn fixture() -> Result<GateFixture> {
  GateFixture::new(&[("app.py", BASE_APP), ("README.md", "# demo\n")])
}

#[test]
fn test_clean_change_passes() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("clean", &[("app.py", "x = 2\n# score: 9.50\n")])?;

  let output = fx.check(&review, &[])?;
  let out = stdout(&output);

  assert_eq!(output.status.code(), Some(0), "stdout: {}\nstderr: {}", out, stderr(&output));
  assert!(out.contains("Gate passed"));
  assert!(out.contains("Passed pylint validation."));
  Ok(())
}

#[test]
fn test_new_error_is_rejected() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("broken", &[("app.py", "x = 1\ny = UNDEFINED\n# score: 9.50\n")])?;

  let output = fx.check(&review, &[])?;
  let out = stdout(&output);

  assert_eq!(output.status.code(), Some(1), "stdout: {}\nstderr: {}", out, stderr(&output));
  assert!(out.contains("Gate rejected (score -1.00)"));
  assert!(out.contains("Failed pylint validation!"));
  assert!(out.contains("app.py:2: E0602 (undefined-variable)"));
  Ok(())
}

#[test]
fn test_existing_error_is_not_new() -> Result<()> {
  let fx = GateFixture::new(&[("app.py", "y = UNDEFINED\n# score: 9.50\n")])?;
  // the error moves down a line but is the same issue
  let review = fx.push_review("moved", &[("app.py", "x = 1\ny = UNDEFINED\n# score: 9.50\n")])?;

  let output = fx.check(&review, &[])?;
  assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
  Ok(())
}

#[test]
fn test_low_score_is_rejected() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("sloppy", &[("app.py", "x = 2\n# score: 7.00\n")])?;

  let output = fx.check(&review, &[])?;
  assert_eq!(output.status.code(), Some(1), "stdout: {}", stdout(&output));
  assert!(stdout(&output).contains("Failed pylint validation!"));
  Ok(())
}

#[test]
fn test_threshold_from_config() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("sloppy", &[("app.py", "x = 2\n# score: 7.00\n")])?;

  let mut config = std::fs::read_to_string(&fx.config)?;
  config.insert_str(0, "[gate]\nthreshold = 6.5\n\n");
  std::fs::write(&fx.config, config)?;

  let output = fx.check(&review, &[])?;
  assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
  Ok(())
}

#[test]
fn test_new_file_with_error_is_rejected() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("added", &[("pkg/new.py", "z = UNDEFINED\n")])?;

  let output = fx.check(&review, &[])?;
  assert_eq!(output.status.code(), Some(1), "stdout: {}", stdout(&output));
  assert!(stdout(&output).contains("pkg/new.py:1: E0602"));
  Ok(())
}

#[test]
fn test_unhandled_types_only_pass_neutrally() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("docs", &[("README.md", "# demo\n\nMore docs.\n")])?;

  let output = fx.check(&review, &["--json"])?;
  assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(json["verdict"]["success"], true);
  assert_eq!(json["verdict"]["score"], 0.0);
  assert_eq!(json["verdict"]["message"], "");
  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("broken", &[("app.py", "y = UNDEFINED\n# score: 9.50\n")])?;

  let output = fx.check(&review, &["--json"])?;
  assert_eq!(output.status.code(), Some(1));

  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert!(json["generated_at"].is_string());
  assert!(json["revision"].as_str().is_some_and(|r| !r.is_empty()));
  assert_eq!(json["verdict"]["success"], false);
  assert_eq!(json["verdicts"]["py"]["score"], -1.0);
  assert_eq!(json["snapshots"]["old"]["py"]["errors"], 0);
  assert_eq!(json["snapshots"]["new"]["py"]["errors"], 1);
  Ok(())
}

#[test]
fn test_tool_failure_is_recorded_not_fatal() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("usage", &[("bad.py", "USAGE_ERROR\n")])?;

  let output = fx.check(&review, &[])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "stdout: {}\nstderr: {}", out, stderr(&output));
  assert!(out.contains("could not be analyzed"));
  assert!(out.contains("bad.py"));
  Ok(())
}

#[test]
fn test_missing_review_is_user_error() -> Result<()> {
  let fx = fixture()?;
  let config = fx.config.to_str().unwrap_or_default().to_string();

  let output = run_glint(&fx.clone, &["check", "--no-publish", "--config", &config])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("Missing required setting: review"));
  Ok(())
}

#[test]
fn test_review_id_conflicts_with_target() -> Result<()> {
  let fx = fixture()?;
  let output = run_glint(&fx.clone, &["check", "-i", "1/1/1", "--target", "x", "--no-publish"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}

#[test]
fn test_unknown_ref_is_fatal_system_error() -> Result<()> {
  let fx = fixture()?;

  let output = fx.check("does-not-exist", &[])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Git command failed"));
  assert!(stdout(&output).is_empty());
  Ok(())
}

#[test]
fn test_publishing_requires_gerrit_host() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("clean", &[("app.py", "x = 2\n# score: 9.50\n")])?;
  let config = fx.config.to_str().unwrap_or_default().to_string();

  let output = run_glint(&fx.clone, &["check", "--target", &review, "--config", &config])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("gerrit.host"));
  Ok(())
}

#[test]
fn test_malformed_plugin_is_rejected() -> Result<()> {
  let fx = fixture()?;
  let review = fx.push_review("clean", &[("app.py", "x = 2\n# score: 9.50\n")])?;

  let mut config = std::fs::read_to_string(&fx.config)?;
  config.push_str("\n[[validators]]\nname = \"dotted\"\nextensions = [\".py\"]\n");
  std::fs::write(&fx.config, config)?;

  let output = fx.check(&review, &[])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("Plugin registration failed"));
  Ok(())
}
