//! File-type keyed plugin registry
//!
//! Analyzers and validators are both routed by file type. A registry is an
//! explicit object built at startup (never a global), populated with
//! defaults, then extended from configuration. Lookups never fail: a file
//! type without a plugin resolves to the registry's null plugin.
//!
//! Later registrations shadow earlier ones for the same key. That is how a
//! `glint.toml` entry replaces a built-in default, so it is not an error.

use crate::core::error::RegistrationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Normalized routing key derived from a file path
///
/// Lower-cased extension without the dot. Files without an extension
/// (including dotfiles such as `.bashrc`) use the empty key.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileType(String);

impl FileType {
  /// Key for files that have no extension
  pub fn none() -> Self {
    FileType(String::new())
  }

  /// Derive the key for a path
  pub fn of(path: &Path) -> Self {
    match path.extension() {
      Some(ext) => FileType(ext.to_string_lossy().to_lowercase()),
      None => FileType::none(),
    }
  }

  /// Parse a declared key, rejecting anything `FileType::of` could never produce
  pub fn parse(key: &str) -> Option<Self> {
    let valid = !key.contains(['.', '/', '\\'])
      && !key.chars().any(char::is_whitespace)
      && key.to_lowercase() == key;
    valid.then(|| FileType(key.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for FileType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      write!(f, "(none)")
    } else {
      write!(f, "{}", self.0)
    }
  }
}

/// Shape every registrable plugin must expose
pub trait Plugin: Send + Sync {
  /// Unique name for this plugin (kebab-case)
  fn name(&self) -> &str;

  /// File-type keys this plugin handles, as declared (not yet normalized)
  fn file_types(&self) -> Vec<String>;
}

/// Mapping from file type to plugin, with a null fallback
pub struct PluginRegistry<P: ?Sized + Plugin> {
  plugins: BTreeMap<FileType, Arc<P>>,
  null: Arc<P>,
}

impl<P: ?Sized + Plugin> PluginRegistry<P> {
  /// Create an empty registry that falls back to `null`
  pub fn new(null: Arc<P>) -> Self {
    Self {
      plugins: BTreeMap::new(),
      null,
    }
  }

  /// Register a plugin for every file type it declares
  ///
  /// All keys are validated before anything is inserted, so a rejected
  /// plugin leaves the registry exactly as it was.
  pub fn register(&mut self, plugin: Arc<P>) -> Result<(), RegistrationError> {
    let name = plugin.name().to_string();
    if name.trim().is_empty() {
      return Err(RegistrationError::MissingName);
    }

    let declared = plugin.file_types();
    if declared.is_empty() {
      return Err(RegistrationError::NoFileTypes { plugin: name });
    }

    let keys = declared
      .into_iter()
      .map(|key| {
        FileType::parse(&key).ok_or_else(|| RegistrationError::InvalidFileType {
          plugin: name.clone(),
          key,
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    for key in keys {
      if let Some(previous) = self.plugins.insert(key.clone(), Arc::clone(&plugin)) {
        tracing::debug!(file_type = %key, old = previous.name(), new = %name, "plugin shadowed");
      }
    }

    Ok(())
  }

  /// Plugin for `key`, or the null plugin when nothing is registered
  pub fn get(&self, key: &FileType) -> Arc<P> {
    self.plugins.get(key).map(Arc::clone).unwrap_or_else(|| Arc::clone(&self.null))
  }

  /// Whether a real (non-null) plugin handles `key`
  pub fn contains(&self, key: &FileType) -> bool {
    self.plugins.contains_key(key)
  }

  /// Fallback for unregistered file types
  pub fn null(&self) -> &Arc<P> {
    &self.null
  }

  /// Registered plugins in file-type order
  pub fn entries(&self) -> impl Iterator<Item = (&FileType, &Arc<P>)> {
    self.plugins.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Named: Plugin {}

  struct Stub {
    name: &'static str,
    types: Vec<&'static str>,
  }

  impl Plugin for Stub {
    fn name(&self) -> &str {
      self.name
    }

    fn file_types(&self) -> Vec<String> {
      self.types.iter().map(|t| t.to_string()).collect()
    }
  }

  impl Named for Stub {}

  fn registry() -> PluginRegistry<dyn Named> {
    PluginRegistry::new(Arc::new(Stub {
      name: "null",
      types: vec![],
    }))
  }

  #[test]
  fn test_file_type_of() {
    assert_eq!(FileType::of(Path::new("pkg/mod.py")).as_str(), "py");
    assert_eq!(FileType::of(Path::new("README.MD")).as_str(), "md");
    assert_eq!(FileType::of(Path::new("Makefile")), FileType::none());
    assert_eq!(FileType::of(Path::new(".bashrc")), FileType::none());
    assert_eq!(FileType::of(Path::new("archive.tar.gz")).as_str(), "gz");
  }

  #[test]
  fn test_file_type_parse() {
    assert!(FileType::parse("py").is_some());
    assert!(FileType::parse("").is_some());
    assert!(FileType::parse(".py").is_none());
    assert!(FileType::parse("PY").is_none());
    assert!(FileType::parse("p y").is_none());
    assert!(FileType::parse("a/b").is_none());
  }

  #[test]
  fn test_get_falls_back_to_null() {
    let reg = registry();
    assert_eq!(reg.get(&FileType::of(Path::new("x.rs"))).name(), "null");
    assert!(!reg.contains(&FileType::of(Path::new("x.rs"))));
  }

  #[test]
  fn test_last_registration_wins() {
    let mut reg = registry();
    reg.register(Arc::new(Stub { name: "first", types: vec!["py"] })).unwrap();
    reg.register(Arc::new(Stub { name: "second", types: vec!["py", "pyi"] })).unwrap();

    let py = FileType::parse("py").unwrap();
    let pyi = FileType::parse("pyi").unwrap();
    assert_eq!(reg.get(&py).name(), "second");
    assert_eq!(reg.get(&pyi).name(), "second");
    assert_eq!(reg.entries().count(), 2);
  }

  #[test]
  fn test_rejected_registration_leaves_registry_intact() {
    let mut reg = registry();
    reg.register(Arc::new(Stub { name: "pylint", types: vec!["py"] })).unwrap();
    let py = FileType::parse("py").unwrap();
    let before = reg.get(&py).name().to_string();

    // second key is malformed, so the valid first key must not be inserted either
    let err = reg
      .register(Arc::new(Stub { name: "broken", types: vec!["py", ".js"] }))
      .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidFileType { ref key, .. } if key == ".js"));
    assert_eq!(reg.get(&py).name(), before);
    assert_eq!(reg.entries().count(), 1);

    assert_eq!(
      reg.register(Arc::new(Stub { name: "", types: vec!["py"] })),
      Err(RegistrationError::MissingName)
    );
    assert!(matches!(
      reg.register(Arc::new(Stub { name: "empty", types: vec![] })),
      Err(RegistrationError::NoFileTypes { .. })
    ));
    assert_eq!(reg.get(&py).name(), "pylint");
  }
}
