//! Analysis rejection taxonomy
//!
//! Every rejection carries a stable `ARMOR_*` code and the detail needed to
//! act on it without re-running the analysis.

use thiserror::Error;

use super::verdict::Stage;
use crate::codec::{CodecKind, DecodeError};
use crate::envelope::{LocateError, MarkerDiagnostics};
use crate::registry::RegistryError;

/// Result type for analysis steps
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Why an input was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no armored envelope found: {0}")]
    EnvelopeNotFound(MarkerDiagnostics),

    #[error("end marker precedes start marker: {0}")]
    MalformedMarkerOrder(MarkerDiagnostics),

    #[error("{0}")]
    CodecExhausted(DecodeError),

    #[error(
        "decoded {decoded_len} bytes with {codec} but none of {signatures_checked} signatures matched"
    )]
    NoSignatureMatch {
        codec: CodecKind,
        decoded_len: usize,
        signatures_checked: usize,
    },

    #[error("input of {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::EnvelopeNotFound(_) => "ARMOR_ENVELOPE_NOT_FOUND",
            AnalysisError::MalformedMarkerOrder(_) => "ARMOR_MALFORMED_MARKER_ORDER",
            AnalysisError::CodecExhausted(_) => "ARMOR_CODEC_EXHAUSTED",
            AnalysisError::NoSignatureMatch { .. } => "ARMOR_NO_SIGNATURE_MATCH",
            AnalysisError::InputTooLarge { .. } => "ARMOR_INPUT_TOO_LARGE",
            AnalysisError::Internal(_) => "ARMOR_INTERNAL",
        }
    }

    /// Stage whose check produced this error; `None` for internal faults
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            AnalysisError::InputTooLarge { .. } => Some(Stage::Received),
            AnalysisError::EnvelopeNotFound(_) | AnalysisError::MalformedMarkerOrder(_) => {
                Some(Stage::Located)
            }
            AnalysisError::CodecExhausted(_) => Some(Stage::Decoded),
            AnalysisError::NoSignatureMatch { .. } => Some(Stage::Verified),
            AnalysisError::Internal(_) => None,
        }
    }

    /// Both marker failures count as "no envelope"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AnalysisError::EnvelopeNotFound(_) | AnalysisError::MalformedMarkerOrder(_)
        )
    }

    /// Internal faults indicate a bug or poisoned state, not a bad input
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::Internal(_))
    }
}

impl From<LocateError> for AnalysisError {
    fn from(err: LocateError) -> Self {
        let diagnostics = err.diagnostics().clone();
        if diagnostics.out_of_order().is_some() {
            AnalysisError::MalformedMarkerOrder(diagnostics)
        } else {
            AnalysisError::EnvelopeNotFound(diagnostics)
        }
    }
}

impl From<DecodeError> for AnalysisError {
    fn from(err: DecodeError) -> Self {
        AnalysisError::CodecExhausted(err)
    }
}

impl From<RegistryError> for AnalysisError {
    fn from(err: RegistryError) -> Self {
        AnalysisError::Internal(err.to_string())
    }
}
