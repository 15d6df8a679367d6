//! CLI commands for glint
//!
//! - **check**: gate a review against its baseline and publish the verdict
//! - **analyze**: run analyzers over working-tree files and print the report
//! - **plugins**: show which analyzer/validator handles each file type

pub mod analyze;
pub mod check;
pub mod plugins;

pub use analyze::run_analyze;
pub use check::{CheckOptions, run_check};
pub use plugins::run_plugins;
