//! glint configuration
//!
//! Searched in the repository root in order: `glint.toml`, `.glint.toml`,
//! `.config/glint.toml`. A missing file is fine: every setting has a
//! default, and CLI flags / environment variables override the file.
//!
//! ```toml
//! [gate]
//! branch = "development"
//! threshold = 9.0
//!
//! [gerrit]
//! host = "review.example.com"
//! user = "lunatest"
//!
//! [[analyzers]]
//! name = "pylint3"
//! kind = "pylint"
//! extensions = ["py"]
//! program = "python3"
//! args = ["-m", "pylint", "--confidence=HIGH"]
//!
//! [[validators]]
//! name = "strict-python"
//! kind = "score"
//! extensions = ["py"]
//! threshold = 9.5
//! checks = ["no-new-issues", "above-score-threshold"]
//! ```

use crate::checks::checkers::{AboveScoreThreshold, AnalysisFailures, Checker, NoNewIssues};
use crate::checks::{DEFAULT_THRESHOLD, ScoreValidator, ValidatorRegistry, default_validators};
use crate::core::error::{ConfigError, GlintError, GlintResult, RegistrationError, ResultExt};
use crate::lint::pylint::PylintAnalyzer;
use crate::lint::{AnalyzerRegistry, Severity, default_analyzers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlintConfig {
  #[serde(default)]
  pub gate: GateConfig,
  #[serde(default)]
  pub gerrit: GerritConfig,
  #[serde(default)]
  pub analyzers: Vec<AnalyzerConfig>,
  #[serde(default)]
  pub validators: Vec<ValidatorConfig>,
}

/// Where the baseline comes from and what score passes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
  /// Branch the review is compared against
  #[serde(default = "default_branch")]
  pub branch: String,

  /// Remote to fetch from (default: first remote of the repository)
  #[serde(default)]
  pub remote: Option<String>,

  /// Threshold for the built-in pylint validator
  #[serde(default = "default_threshold")]
  pub threshold: f64,
}

fn default_branch() -> String {
  "development".to_string()
}

fn default_threshold() -> f64 {
  DEFAULT_THRESHOLD
}

impl Default for GateConfig {
  fn default() -> Self {
    Self {
      branch: default_branch(),
      remote: None,
      threshold: default_threshold(),
    }
  }
}

/// Gerrit ssh endpoint and vote mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GerritConfig {
  #[serde(default)]
  pub host: Option<String>,
  #[serde(default)]
  pub user: Option<String>,
  #[serde(default = "default_port")]
  pub port: u16,
  /// Code-Review vote posted when the gate passes
  #[serde(default = "default_pass_vote")]
  pub pass_vote: i8,
  /// Code-Review vote posted when the gate rejects
  #[serde(default = "default_fail_vote")]
  pub fail_vote: i8,
}

fn default_port() -> u16 {
  29418
}

fn default_pass_vote() -> i8 {
  1
}

fn default_fail_vote() -> i8 {
  -1
}

impl Default for GerritConfig {
  fn default() -> Self {
    Self {
      host: None,
      user: None,
      port: default_port(),
      pass_vote: default_pass_vote(),
      fail_vote: default_fail_vote(),
    }
  }
}

/// `[[analyzers]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
  pub name: String,
  #[serde(default = "default_analyzer_kind")]
  pub kind: String,
  #[serde(default)]
  pub extensions: Vec<String>,
  #[serde(default)]
  pub program: Option<String>,
  #[serde(default)]
  pub args: Option<Vec<String>>,
}

fn default_analyzer_kind() -> String {
  "pylint".to_string()
}

/// `[[validators]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
  pub name: String,
  #[serde(default = "default_validator_kind")]
  pub kind: String,
  #[serde(default)]
  pub extensions: Vec<String>,
  #[serde(default = "default_threshold")]
  pub threshold: f64,
  #[serde(default = "default_checks")]
  pub checks: Vec<String>,
  /// Lowest severity `no-new-issues` looks at
  #[serde(default = "default_min_severity")]
  pub min_severity: Severity,
}

fn default_validator_kind() -> String {
  "score".to_string()
}

fn default_checks() -> Vec<String> {
  vec![
    "no-new-issues".to_string(),
    "above-score-threshold".to_string(),
    "analysis-failures".to_string(),
  ]
}

fn default_min_severity() -> Severity {
  Severity::Error
}

impl GlintConfig {
  /// Find config file in search order: glint.toml, .glint.toml, .config/glint.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = [
      root.join("glint.toml"),
      root.join(".glint.toml"),
      root.join(".config").join("glint.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from an explicit path, or search `root`; defaults if none found
  pub fn load(root: &Path, explicit: Option<&Path>) -> GlintResult<Self> {
    let path = match explicit {
      Some(path) if !path.is_file() => {
        return Err(GlintError::Config(ConfigError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(root) {
        Some(path) => path,
        None => {
          tracing::debug!(root = %root.display(), "no config file, using defaults");
          return Ok(Self::default());
        }
      },
    };

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Parse and validate TOML text
  pub fn parse(content: &str) -> GlintResult<Self> {
    let config: GlintConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate value ranges
  pub fn validate(&self) -> GlintResult<()> {
    check_threshold("gate.threshold", self.gate.threshold)?;
    for v in &self.validators {
      check_threshold(&format!("validators.{}.threshold", v.name), v.threshold)?;
    }

    if self.gerrit.port == 0 {
      return Err(GlintError::Config(ConfigError::InvalidValue {
        field: "gerrit.port".to_string(),
        reason: "must be a non-zero TCP port".to_string(),
      }));
    }

    Ok(())
  }

  /// Built-in analyzers, then configured ones (which shadow built-ins)
  pub fn analyzers(&self) -> GlintResult<AnalyzerRegistry> {
    let mut registry = default_analyzers();
    for entry in &self.analyzers {
      let analyzer = build_analyzer(entry)?;
      registry.register(Arc::new(analyzer))?;
      tracing::debug!(analyzer = %entry.name, "registered configured analyzer");
    }
    Ok(registry)
  }

  /// Built-in validators, then configured ones (which shadow built-ins)
  pub fn validators(&self) -> GlintResult<ValidatorRegistry> {
    let mut registry = default_validators(self.gate.threshold);
    for entry in &self.validators {
      let validator = build_validator(entry)?;
      registry.register(Arc::new(validator))?;
      tracing::debug!(validator = %entry.name, "registered configured validator");
    }
    Ok(registry)
  }
}

fn check_threshold(field: &str, value: f64) -> GlintResult<()> {
  if !(0.0..=10.0).contains(&value) {
    return Err(GlintError::Config(ConfigError::InvalidValue {
      field: field.to_string(),
      reason: format!("{} is outside 0..=10", value),
    }));
  }
  Ok(())
}

fn build_analyzer(entry: &AnalyzerConfig) -> Result<PylintAnalyzer, RegistrationError> {
  match entry.kind.as_str() {
    "pylint" => {
      let program = match &entry.program {
        Some(p) if p.trim().is_empty() => {
          return Err(RegistrationError::MissingField {
            plugin: entry.name.clone(),
            field: "program".to_string(),
          });
        }
        Some(p) => p.clone(),
        None => "pylint".to_string(),
      };
      let args = entry
        .args
        .clone()
        .unwrap_or_else(|| vec!["--confidence=HIGH".to_string()]);
      let extensions = if entry.extensions.is_empty() {
        vec!["py".to_string()]
      } else {
        entry.extensions.clone()
      };
      Ok(PylintAnalyzer::new(&entry.name, extensions, program, args))
    }
    other => Err(RegistrationError::UnknownKind {
      plugin: entry.name.clone(),
      kind: other.to_string(),
    }),
  }
}

fn build_validator(entry: &ValidatorConfig) -> Result<ScoreValidator, RegistrationError> {
  if entry.kind != "score" {
    return Err(RegistrationError::UnknownKind {
      plugin: entry.name.clone(),
      kind: entry.kind.clone(),
    });
  }

  let mut validator = ScoreValidator::new(&entry.name, entry.extensions.clone(), entry.threshold);
  for check in &entry.checks {
    let checker: Arc<dyn Checker> = match check.as_str() {
      "no-new-issues" => Arc::new(NoNewIssues {
        min_severity: entry.min_severity,
      }),
      "above-score-threshold" => Arc::new(AboveScoreThreshold {
        threshold: entry.threshold,
      }),
      "analysis-failures" => Arc::new(AnalysisFailures),
      other => {
        return Err(RegistrationError::UnknownChecker {
          plugin: entry.name.clone(),
          checker: other.to_string(),
        });
      }
    };
    validator = validator.with_checker(checker);
  }
  Ok(validator)
}
