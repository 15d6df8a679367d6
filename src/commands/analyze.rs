//! `glint analyze`: run the analyzers over working-tree files, no checkout

use crate::core::config::GlintConfig;
use crate::core::error::GlintResult;
use crate::lint::classify;
use crate::pipeline::Pipeline;
use crate::report::render_snapshot;
use std::path::PathBuf;

/// Run the analyze command
pub fn run_analyze(files: Vec<PathBuf>, repo: Option<PathBuf>, config: Option<PathBuf>, json: bool) -> GlintResult<()> {
  let root = match repo {
    Some(path) => path,
    None => std::env::current_dir()?,
  };

  let config = GlintConfig::load(&root, config.as_deref())?;
  let analyzers = config.analyzers()?;
  let validators = config.validators()?;

  let groups = classify(&files);
  for file_type in groups.keys().filter(|t| !analyzers.contains(t)) {
    tracing::warn!(file_type = %file_type, "no analyzer registered, skipping");
  }
  let snapshots = Pipeline::new(&analyzers, &validators)
    .with_progress(!json)
    .analyze(&groups, &root, "working tree");

  if json {
    println!("{}", serde_json::to_string_pretty(&snapshots)?);
    return Ok(());
  }

  if snapshots.values().all(|s| s.is_empty()) {
    println!("No analyzer handled the given files");
    return Ok(());
  }

  for (file_type, snapshot) in &snapshots {
    if snapshot.is_empty() {
      continue;
    }
    let analyzer = analyzers.get(file_type);
    println!("── {} ({}) ──", file_type, analyzer.name());
    print!("{}", render_snapshot(snapshot));
    println!();
  }

  Ok(())
}
