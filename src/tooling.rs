//! Tooling & Integration Layer
//!
//! Command-line front end over the forest service.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, ConfirmHook};
