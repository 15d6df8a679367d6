//! Error types for glint with contextual messages and exit codes
//!
//! Every fatal error maps to an exit code that is distinct from the
//! pass/fail code of a completed gate run, so CI can tell "the change was
//! rejected" apart from "the gate could not run".

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for glint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Gate ran to completion and accepted the change
  Passed = 0,
  /// Gate ran to completion and rejected the change
  Rejected = 1,
  /// User error (config, invalid args, malformed plugin)
  User = 2,
  /// System error (git, ssh, I/O)
  System = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for glint
#[derive(Debug)]
pub enum GlintError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors (checkout, fetch, diff)
  Git(GitError),

  /// Plugin registration rejected
  Registration(RegistrationError),

  /// Posting the verdict failed
  Publish(PublishError),

  /// I/O errors
  Io(io::Error),

  /// Structured error with the operation that produced it
  Context { context: String, source: Box<GlintError> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl GlintError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    GlintError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  ///
  /// Messages fold the context in; structured variants are wrapped so their
  /// help text and exit code still come from the original error.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      GlintError::Message { message, context, help } => GlintError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      GlintError::Git(GitError::CommandFailed { command, stderr }) => GlintError::Git(GitError::CommandFailed {
        command: format!("{} ({})", command, ctx_str),
        stderr,
      }),
      other => GlintError::Context {
        context: ctx_str,
        source: Box::new(other),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      GlintError::Config(_) => ExitCode::User,
      GlintError::Git(_) => ExitCode::System,
      GlintError::Registration(_) => ExitCode::User,
      GlintError::Publish(_) => ExitCode::System,
      GlintError::Io(_) => ExitCode::System,
      GlintError::Context { source, .. } => source.exit_code(),
      GlintError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      GlintError::Config(e) => e.help_message(),
      GlintError::Git(e) => e.help_message(),
      GlintError::Registration(_) => {
        Some("Check the [[analyzers]] and [[validators]] tables in glint.toml.".to_string())
      }
      GlintError::Publish(e) => e.help_message(),
      GlintError::Context { source, .. } => source.help_message(),
      GlintError::Message { help, .. } => help.clone(),
      GlintError::Io(_) => None,
    }
  }
}

impl fmt::Display for GlintError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GlintError::Config(e) => write!(f, "{}", e),
      GlintError::Git(e) => write!(f, "{}", e),
      GlintError::Registration(e) => write!(f, "{}", e),
      GlintError::Publish(e) => write!(f, "{}", e),
      GlintError::Io(e) => write!(f, "I/O error: {}", e),
      GlintError::Context { context, source } => write!(f, "{}\n{}", source, context),
      GlintError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for GlintError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GlintError::Io(e) => Some(e),
      GlintError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for GlintError {
  fn from(err: io::Error) -> Self {
    GlintError::Io(err)
  }
}

impl From<RegistrationError> for GlintError {
  fn from(err: RegistrationError) -> Self {
    GlintError::Registration(err)
  }
}

impl From<toml_edit::de::Error> for GlintError {
  fn from(err: toml_edit::de::Error) -> Self {
    GlintError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for GlintError {
  fn from(err: serde_json::Error) -> Self {
    GlintError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// Missing required setting
  MissingField { field: String },

  /// Setting present but out of range
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Drop --config to use glint.toml from the repository root, or defaults.".to_string())
      }
      ConfigError::MissingField { field } if field == "review" => {
        Some("Pass --review-id, --target, or set GERRIT_REFSPEC.".to_string())
      }
      ConfigError::MissingField { field } if field.starts_with("gerrit.") => {
        Some("Pass --host/--user (or GERRIT_HOST/USER), or use --no-publish.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::MissingField { field } => write!(f, "Missing required setting: {}", field),
      ConfigError::InvalidValue { field, reason } => write!(f, "Invalid value for {}: {}", field, reason),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Repository has no remote to fetch reviews from
  NoRemote,
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!("Point --repo at a git checkout (got {})", path.display())),
      GitError::NoRemote => Some("Add a remote or pass --remote.".to_string()),
      GitError::CommandFailed { stderr, .. } if stderr.contains("couldn't find remote ref") => {
        Some("Check the review id / branch name; the ref does not exist on the remote.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => write!(f, "Git repository not found at: {}", path.display()),
      GitError::NoRemote => write!(f, "Git repository has no remotes"),
    }
  }
}

/// Plugin registration errors
///
/// Raised before the registry is touched, so a rejected plugin never
/// leaves a partial mapping behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
  /// Plugin has an empty name
  MissingName,
  /// Plugin declares no file types
  NoFileTypes { plugin: String },
  /// A declared file type is not a normalized key
  InvalidFileType { plugin: String, key: String },
  /// Config entry names a plugin kind that does not exist
  UnknownKind { plugin: String, kind: String },
  /// Config entry names a checker that does not exist
  UnknownChecker { plugin: String, checker: String },
  /// Config entry is missing a required field
  MissingField { plugin: String, field: String },
}

impl fmt::Display for RegistrationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RegistrationError::MissingName => write!(f, "Plugin registration failed: plugin has no name"),
      RegistrationError::NoFileTypes { plugin } => {
        write!(f, "Plugin registration failed: '{}' declares no file types", plugin)
      }
      RegistrationError::InvalidFileType { plugin, key } => write!(
        f,
        "Plugin registration failed: '{}' declares invalid file type '{}' (expected a lower-case extension without the dot)",
        plugin, key
      ),
      RegistrationError::UnknownKind { plugin, kind } => {
        write!(f, "Plugin registration failed: '{}' has unknown kind '{}'", plugin, kind)
      }
      RegistrationError::UnknownChecker { plugin, checker } => {
        write!(f, "Plugin registration failed: '{}' uses unknown check '{}'", plugin, checker)
      }
      RegistrationError::MissingField { plugin, field } => {
        write!(f, "Plugin registration failed: '{}' is missing '{}'", plugin, field)
      }
    }
  }
}

/// Verdict publishing errors
#[derive(Debug)]
pub enum PublishError {
  /// Transport command failed
  CommandFailed { command: String, stderr: String },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::CommandFailed { stderr, .. } if stderr.contains("Permission denied") => {
        Some("Check the ssh user and that its key is registered with Gerrit.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::CommandFailed { command, stderr } => {
        write!(f, "Failed to publish verdict: {}\n{}", command, stderr.trim_end())
      }
    }
  }
}

/// Result type alias for glint
pub type GlintResult<T> = Result<T, GlintError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> GlintResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> GlintResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<GlintError>,
{
  fn context(self, ctx: impl Into<String>) -> GlintResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> GlintResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &GlintError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
