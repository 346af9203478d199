//! CLI argument definitions using clap
//!
//! Commands:
//! - armorscan scan [pattern] --json <path>
//! - armorscan analyze <path>
//! - armorscan serve --port <port>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::Severity;

/// armorscan - locate, decode and verify armored contract envelopes
#[derive(Parser, Debug)]
#[command(name = "armorscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum log severity written to stderr
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Severity,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze every file matching a glob and write the registry export
    Scan {
        /// Glob pattern of files to scan
        #[arg(default_value = "*.html")]
        pattern: String,

        /// Where to write the export JSON
        #[arg(long, default_value = "index.json")]
        json: PathBuf,

        /// Register every envelope in a file, not just the first
        #[arg(long)]
        all: bool,

        /// Try every codec and prefer a decode with signature matches
        #[arg(long)]
        exhaustive: bool,
    },

    /// Analyze one file and print its verdict as JSON
    Analyze {
        /// File to analyze
        path: PathBuf,

        /// Identifier reported in the verdict (default: the path)
        #[arg(long)]
        source_id: Option<String>,

        /// Try every codec and list all candidates
        #[arg(long)]
        exhaustive: bool,
    },

    /// Run the HTTP analysis server
    Serve {
        /// Port override for the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["armorscan", "scan"]).unwrap();
        assert_eq!(cli.log_level, Severity::Info);
        match cli.command {
            Command::Scan {
                pattern,
                json,
                all,
                exhaustive,
            } => {
                assert_eq!(pattern, "*.html");
                assert_eq!(json, PathBuf::from("index.json"));
                assert!(!all);
                assert!(!exhaustive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "armorscan",
            "analyze",
            "doc.html",
            "--log-level",
            "warn",
            "--config",
            "armorscan.json",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Severity::Warn);
        assert_eq!(cli.config, Some(PathBuf::from("armorscan.json")));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["armorscan", "--log-level", "loud", "scan"]).is_err());
    }
}
