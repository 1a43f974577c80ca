//! Tooling & Integration Layer
//!
//! Command-line front end over the merge pipeline, plus text/JSON formatting
//! of resolved paths and merge outcomes.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, ConsoleNotifier};
