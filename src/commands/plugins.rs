//! `glint plugins`: show how file types are routed

use crate::core::config::GlintConfig;
use crate::core::error::GlintResult;
use crate::core::registry::{FileType, Plugin, PluginRegistry};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Run the plugins command
pub fn run_plugins(repo: Option<PathBuf>, config: Option<PathBuf>) -> GlintResult<()> {
  let root = match repo {
    Some(path) => path,
    None => std::env::current_dir()?,
  };

  let config = GlintConfig::load(&root, config.as_deref())?;
  let analyzers = config.analyzers()?;
  let validators = config.validators()?;

  let types: BTreeSet<&FileType> = analyzers
    .entries()
    .map(|(k, _)| k)
    .chain(validators.entries().map(|(k, _)| k))
    .collect();

  println!("{:<10} {:<20} {:<20}", "TYPE", "ANALYZER", "VALIDATOR");
  for file_type in types {
    println!(
      "{:<10} {:<20} {:<20}",
      file_type.to_string(),
      analyzers.get(file_type).name(),
      validators.get(file_type).name()
    );
  }
  println!(
    "{:<10} {:<20} {:<20}",
    "*",
    fallback_name(&analyzers),
    fallback_name(&validators)
  );

  println!();
  let mut described = BTreeSet::new();
  for (_, analyzer) in analyzers.entries() {
    if described.insert(("analyzer", analyzer.name().to_string())) {
      println!("analyzer  {}: {}", analyzer.name(), analyzer.description());
    }
  }
  for (_, validator) in validators.entries() {
    if described.insert(("validator", validator.name().to_string())) {
      println!("validator {}: {}", validator.name(), validator.description());
    }
  }

  Ok(())
}

/// Name of the plugin unregistered types fall back to
fn fallback_name<P: ?Sized + Plugin>(registry: &PluginRegistry<P>) -> String {
  registry.null().name().to_string()
}
