//! Console and JSON rendering of gate results
//!
//! Renderers return strings; commands decide where they go.

use crate::checks::Verdict;
use crate::core::registry::FileType;
use crate::core::vcs::RevisionId;
use crate::lint::{Snapshot, SnapshotSet};
use crate::pipeline::PipelineRun;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Machine-readable result of `glint check --json`
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
  pub generated_at: DateTime<Utc>,
  pub revision: &'a RevisionId,
  pub verdict: &'a Verdict,
  pub verdicts: &'a BTreeMap<FileType, Verdict>,
  pub snapshots: JsonSnapshots<'a>,
}

#[derive(Debug, Serialize)]
pub struct JsonSnapshots<'a> {
  pub old: &'a SnapshotSet,
  pub new: &'a SnapshotSet,
}

impl<'a> JsonReport<'a> {
  pub fn new(run: &'a PipelineRun) -> Self {
    Self {
      generated_at: Utc::now(),
      revision: &run.revision,
      verdict: &run.verdict,
      verdicts: &run.verdicts,
      snapshots: JsonSnapshots {
        old: &run.old,
        new: &run.new,
      },
    }
  }
}

/// Per-file messages and scores, then the snapshot totals
pub fn render_snapshot(snapshot: &Snapshot) -> String {
  let mut out = String::new();

  for (path, analysis) in &snapshot.files {
    let _ = writeln!(out, "📄 {}", path);
    if let Some(reason) = &analysis.failure {
      let _ = writeln!(out, "   ⚠️  analysis failed: {}", reason);
      continue;
    }
    for msg in &analysis.messages {
      let _ = writeln!(
        out,
        "   {}:{}: {} ({}) {}",
        msg.line, msg.column, msg.code, msg.symbol, msg.text
      );
    }
    match analysis.score {
      Some(score) => {
        let _ = writeln!(out, "   score: {:.2}/10", score);
      }
      None => {
        let _ = writeln!(out, "   score: n/a");
      }
    }
  }

  let average = snapshot
    .average
    .map(|a| format!("{:.2}", a))
    .unwrap_or_else(|| "n/a".to_string());
  let _ = writeln!(
    out,
    "Total: {} message(s), {} error(s), average score {}",
    snapshot.total, snapshot.errors, average
  );
  out
}

/// One line per file type: pass/fail marker, type, score
pub fn render_verdicts(verdicts: &BTreeMap<FileType, Verdict>) -> String {
  let mut out = String::new();
  for (file_type, verdict) in verdicts {
    let mark = if verdict.success() { "✅" } else { "❌" };
    let _ = writeln!(out, "{} {:<8} {:>6.2}", mark, file_type.to_string(), verdict.score());
  }
  out
}

/// Full console report of a finished run
pub fn render_run(run: &PipelineRun) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "🔍 Revision {}", run.revision);

  let changed: usize = run.files.values().map(Vec::len).sum();
  let _ = writeln!(out, "   {} changed file(s) in {} type(s)", changed, run.files.len());
  out.push('\n');

  for (file_type, snapshot) in &run.new {
    if snapshot.is_empty() {
      continue;
    }
    let _ = writeln!(out, "── {} ──", file_type);
    out.push_str(&render_snapshot(snapshot));
    out.push('\n');
  }

  if !run.verdicts.is_empty() {
    out.push_str(&render_verdicts(&run.verdicts));
    out.push('\n');
  }

  let verdict = &run.verdict;
  if verdict.success() {
    let _ = writeln!(out, "✅ Gate passed (score {:.2})", verdict.score());
  } else {
    let _ = writeln!(out, "❌ Gate rejected (score {:.2})", verdict.score());
  }
  if !verdict.message().is_empty() {
    out.push_str(verdict.message());
  }
  out
}
