//! Tests for the `analyze` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_analyze_working_tree_files() -> Result<()> {
  let fx = GateFixture::new(&[("app.py", "x = 1\ny = UNDEFINED\n# score: 6.25\n"), ("notes.txt", "hi\n")])?;
  let config = fx.config.to_str().unwrap_or_default().to_string();

  let output = run_glint(&fx.clone, &["analyze", "app.py", "notes.txt", "--config", &config])?;
  let out = stdout(&output);

  assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
  assert!(out.contains("── py (fake-pylint) ──"));
  assert!(out.contains("📄 app.py"));
  assert!(out.contains("2:0: E0602 (undefined-variable) Undefined variable 'UNDEFINED'"));
  assert!(out.contains("score: 6.25/10"));
  assert!(out.contains("Total: 1 message(s), 1 error(s), average score 6.25"));
  assert!(!out.contains("notes.txt"));
  Ok(())
}

#[test]
fn test_analyze_json() -> Result<()> {
  let fx = GateFixture::new(&[("app.py", "y = UNDEFINED\n")])?;
  let config = fx.config.to_str().unwrap_or_default().to_string();

  let output = run_glint(&fx.clone, &["analyze", "app.py", "--json", "--config", &config])?;
  assert_eq!(output.status.code(), Some(0));

  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(json["py"]["errors"], 1);
  assert_eq!(json["py"]["average"], 10.0);
  assert_eq!(json["py"]["files"]["app.py"]["messages"][0]["code"], "E0602");
  Ok(())
}

#[test]
fn test_analyze_requires_files() -> Result<()> {
  let fx = GateFixture::new(&[("app.py", "x = 1\n")])?;
  let output = run_glint(&fx.clone, &["analyze"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}
