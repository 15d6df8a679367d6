mod checks;
mod commands;
mod core;
mod lint;
mod pipeline;
mod publish;
mod report;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{ExitCode, GlintError, print_error};
use std::path::PathBuf;

/// Gate Gerrit reviews on lint results: no new errors, no score regressions
#[derive(Parser)]
#[command(name = "glint")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Debug logging (overridden by GLINT_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compare a review against its baseline branch and post the verdict
  Check {
    /// Gerrit change id, e.g. 99/299/3 (checked out as refs/changes/99/299/3)
    #[arg(short = 'i', long)]
    review_id: Option<String>,
    /// Raw ref to review instead of a change id (default: $GERRIT_REFSPEC)
    #[arg(long, conflicts_with = "review_id")]
    target: Option<String>,
    /// Baseline branch (default: gate.branch, "development")
    #[arg(short, long, env = "GERRIT_BRANCH")]
    branch: Option<String>,
    /// Repository to gate (default: current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,
    /// Gerrit ssh user
    #[arg(short, long, env = "USER")]
    user: Option<String>,
    /// Gerrit ssh host
    #[arg(long, env = "GERRIT_HOST")]
    host: Option<String>,
    /// Gerrit ssh port (default: 29418)
    #[arg(long, env = "GERRIT_PORT")]
    port: Option<u16>,
    /// Remote to fetch from (default: first configured remote)
    #[arg(long)]
    remote: Option<String>,
    /// Config file (default: glint.toml in the repository root)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the verdict instead of posting it to Gerrit
    #[arg(long)]
    no_publish: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run analyzers over working-tree files without checking anything out
  Analyze {
    /// Files to analyze, relative to the repository root
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Repository root (default: current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,
    /// Config file (default: glint.toml in the repository root)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output snapshots in JSON format
    #[arg(long)]
    json: bool,
  },

  /// List registered analyzers and validators per file type
  Plugins {
    /// Repository root (default: current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,
    /// Config file (default: glint.toml in the repository root)
    #[arg(long)]
    config: Option<PathBuf>,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// stderr subscriber; GLINT_LOG takes precedence over -v
fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = tracing_subscriber::EnvFilter::try_from_env("GLINT_LOG")
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Check {
      review_id,
      target,
      branch,
      repo,
      user,
      host,
      port,
      remote,
      config,
      no_publish,
      json,
    } => commands::run_check(commands::CheckOptions {
      review_id,
      target,
      branch,
      repo,
      user,
      host,
      port,
      remote,
      config,
      no_publish,
      json,
    }),
    Commands::Analyze {
      files,
      repo,
      config,
      json,
    } => commands::run_analyze(files, repo, config, json).map(|()| ExitCode::Passed),
    Commands::Plugins { repo, config } => commands::run_plugins(repo, config).map(|()| ExitCode::Passed),
  };

  match result {
    Ok(code) => std::process::exit(code.as_i32()),
    Err(err) => handle_error(err),
  }
}

fn handle_error(err: GlintError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
