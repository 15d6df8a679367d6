//! Tests for the `plugins` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_plugins_lists_defaults() -> Result<()> {
  let dir = tempfile::tempdir()?;
  let output = run_glint(dir.path(), &["plugins"])?;
  let out = stdout(&output);

  assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
  let py = out.lines().find(|l| l.starts_with("py ")).unwrap_or_default();
  assert!(py.contains("pylint"), "{}", out);
  let fallback = out.lines().find(|l| l.starts_with('*')).unwrap_or_default();
  assert_eq!(fallback.split_whitespace().collect::<Vec<_>>(), vec!["*", "null", "null"]);
  Ok(())
}

#[test]
fn test_plugins_reflects_config() -> Result<()> {
  let dir = tempfile::tempdir()?;
  std::fs::write(
    dir.path().join("glint.toml"),
    r#"[[analyzers]]
name = "pyi-lint"
extensions = ["pyi"]

[[validators]]
name = "strict"
extensions = ["py", "pyi"]
threshold = 9.5
"#,
  )?;

  let output = run_glint(dir.path(), &["plugins"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

  let row = |key: &str| -> Vec<String> {
    out
      .lines()
      .find(|l| l.split_whitespace().next() == Some(key))
      .map(|l| l.split_whitespace().map(String::from).collect())
      .unwrap_or_default()
  };
  assert_eq!(row("py"), vec!["py", "pylint", "strict"]);
  assert_eq!(row("pyi"), vec!["pyi", "pyi-lint", "strict"]);
  Ok(())
}

#[test]
fn test_plugins_rejects_unknown_kind() -> Result<()> {
  let dir = tempfile::tempdir()?;
  std::fs::write(
    dir.path().join("glint.toml"),
    "[[analyzers]]\nname = \"eslint\"\nkind = \"eslint\"\nextensions = [\"js\"]\n",
  )?;

  let output = run_glint(dir.path(), &["plugins"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("unknown kind 'eslint'"));
  Ok(())
}
