//! CLI module
//!
//! Provides command-line interface for:
//! - scan: Analyze a file set and write the registry export
//! - analyze: Print one verdict as JSON
//! - serve: Run the HTTP boundary

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{analyze, run, run_command, scan, serve, ScanOptions, ScanSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
