//! Core building blocks shared by every command
//!
//! - **config**: glint.toml parsing, validation and registry construction
//! - **error**: error types with contextual help and exit codes
//! - **registry**: file-type keyed plugin registry with null fallback
//! - **vcs**: working-tree control (SystemGit)

pub mod config;
pub mod error;
pub mod registry;
pub mod vcs;
