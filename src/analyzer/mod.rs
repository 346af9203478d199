//! # Analyzer
//!
//! The per-input pipeline: `Received → Located → Decoded → Verified →
//! Registered`, with an early exit to `Rejected` at any check. Rejections
//! are verdicts, not panics.

mod config;
mod errors;
mod pipeline;
mod strings;
mod verdict;

pub use config::AnalyzerConfig;
pub use errors::{AnalysisError, AnalysisResult};
pub use pipeline::Analyzer;
pub use strings::extract_printable;
pub use verdict::{AttemptSummary, Candidate, ChecksumReport, Stage, Verdict};
