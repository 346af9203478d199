//! Analyzer configuration

use serde::{Deserialize, Serialize};

use crate::codec::DecodeMode;
use crate::config::{ConfigError, ConfigResult};
use crate::signature::SpanBoundary;

/// Tuning knobs for one [`Analyzer`](super::Analyzer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Inputs larger than this are rejected before any work (default 4 MiB)
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    /// Stop at the first parsing codec, or try them all
    #[serde(default)]
    pub decode_mode: DecodeMode,

    /// Where each match's sub-payload ends
    #[serde(default)]
    pub span_boundary: SpanBoundary,

    /// List printable strings of the decoded payload in verdicts
    #[serde(default = "default_extract_strings")]
    pub extract_strings: bool,

    #[serde(default = "default_min_string_len")]
    pub min_string_len: usize,

    #[serde(default = "default_max_strings")]
    pub max_strings: usize,
}

fn default_max_input_bytes() -> usize {
    4 * 1024 * 1024
}
fn default_extract_strings() -> bool {
    true
}
fn default_min_string_len() -> usize {
    4
}
fn default_max_strings() -> usize {
    256
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            decode_mode: DecodeMode::default(),
            span_boundary: SpanBoundary::default(),
            extract_strings: default_extract_strings(),
            min_string_len: default_min_string_len(),
            max_strings: default_max_strings(),
        }
    }
}

impl AnalyzerConfig {
    /// Default config with a different size cap
    pub fn with_max_input_bytes(max_input_bytes: usize) -> Self {
        Self {
            max_input_bytes,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "analyzer.max_input_bytes must be > 0".into(),
            ));
        }
        if self.min_string_len == 0 {
            return Err(ConfigError::Invalid(
                "analyzer.min_string_len must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.max_input_bytes, 4_194_304);
        assert_eq!(config.decode_mode, DecodeMode::First);
        assert_eq!(config.span_boundary, SpanBoundary::BufferEnd);
        assert!(config.extract_strings);
        assert_eq!(config.min_string_len, 4);
        assert_eq!(config.max_strings, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{"decode_mode":"exhaustive","span_boundary":"next_match"}"#)
                .unwrap();
        assert_eq!(config.decode_mode, DecodeMode::Exhaustive);
        assert_eq!(config.span_boundary, SpanBoundary::NextMatch);
        assert_eq!(config.max_input_bytes, 4_194_304);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(AnalyzerConfig::with_max_input_bytes(0).validate().is_err());

        let config = AnalyzerConfig {
            min_string_len: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
