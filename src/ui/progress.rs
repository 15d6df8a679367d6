//! Progress indicators for analysis phases
//!
//! Uses `linya` for allocation-free progress bars. Bars are only drawn when
//! stderr is a terminal so CI logs and `--json` consumers stay clean.

use linya::{Bar, Progress};
use std::io::IsTerminal;
use std::sync::Mutex;

/// Progress bar over the files of one analysis phase
pub struct FileProgress {
  progress: Mutex<Progress>,
  bar: Bar,
}

impl FileProgress {
  /// Create a new progress bar for `total` files
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      progress: Mutex::new(progress),
      bar,
    }
  }

  /// Create a bar only if stderr is interactive
  pub fn for_terminal(total: usize, label: impl Into<String>) -> Option<Self> {
    (total > 0 && std::io::stderr().is_terminal()).then(|| Self::new(total, label))
  }

  /// Increment progress by 1
  pub fn inc(&self) {
    if let Ok(mut progress) = self.progress.lock() {
      progress.inc_and_draw(&self.bar, 1);
    }
  }
}
