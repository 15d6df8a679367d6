//! Group changed files by file type

use crate::core::registry::FileType;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Files grouped by file type, in key order
pub type FileGroups = BTreeMap<FileType, Vec<PathBuf>>;

/// Partition `paths` by file type
///
/// Every path lands in exactly one group. Within a group, paths keep their
/// input order.
pub fn classify(paths: &[PathBuf]) -> FileGroups {
  let mut groups = FileGroups::new();
  for path in paths {
    groups.entry(FileType::of(path)).or_default().push(path.clone());
  }
  groups
}
