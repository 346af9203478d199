//! Structured analysis verdicts

use serde::Serialize;

use super::errors::AnalysisError;
use crate::codec::{CodecKind, DecodeAttempt, DecodeOutcome};
use crate::envelope::{ArmorHeaders, EnvelopeSummary, MarkerDiagnostics};
use crate::registry::MatchSummary;

/// Per-input lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Located,
    Decoded,
    Verified,
    Registered,
    Rejected,
}

/// One codec attempt as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptSummary {
    pub codec: CodecKind,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&DecodeAttempt> for AttemptSummary {
    fn from(attempt: &DecodeAttempt) -> Self {
        match &attempt.outcome {
            DecodeOutcome::Success(bytes) => Self {
                codec: attempt.codec,
                ok: true,
                decoded_len: Some(bytes.len()),
                reason: None,
            },
            DecodeOutcome::Failure(err) => Self {
                codec: attempt.codec,
                ok: false,
                decoded_len: None,
                reason: Some(err.to_string()),
            },
        }
    }
}

/// One successful decode and what the scanner found in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub codec: CodecKind,
    pub decoded_len: usize,
    pub matches: Vec<MatchSummary>,
}

/// Declared versus computed payload digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumReport {
    pub expected: String,
    pub actual: String,
    pub matches: bool,
}

/// Outcome of analyzing one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub source_id: String,
    /// Last stage reached: `registered` or `rejected` once finished
    pub stage: Stage,
    /// Stage whose check failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_used: Option<CodecKind>,
    pub matches: Vec<MatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<MarkerDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<ArmorHeaders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    pub attempts: Vec<AttemptSummary>,
    pub strings: Vec<String>,
    pub signatures_checked: usize,
}

impl Verdict {
    /// Fresh verdict for an input that has just arrived
    pub fn received(source_id: impl Into<String>) -> Self {
        Self {
            valid: false,
            source_id: source_id.into(),
            stage: Stage::Received,
            rejected_at: None,
            sequence_number: None,
            codec_used: None,
            matches: Vec::new(),
            error: None,
            error_code: None,
            envelope: None,
            markers: None,
            headers: None,
            decoded_len: None,
            checksum: None,
            candidates: Vec::new(),
            attempts: Vec::new(),
            strings: Vec::new(),
            signatures_checked: 0,
        }
    }

    /// Verdict for an analysis that could not run to completion
    pub fn fault(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::received(source_id).rejected(AnalysisError::Internal(message.into()))
    }

    /// Marks this verdict rejected at the stage `err` belongs to, or at its
    /// current stage for internal faults
    pub fn rejected(mut self, err: AnalysisError) -> Self {
        if let AnalysisError::EnvelopeNotFound(diagnostics)
        | AnalysisError::MalformedMarkerOrder(diagnostics) = &err
        {
            self.markers = Some(diagnostics.clone());
        }
        self.valid = false;
        self.rejected_at = Some(err.failed_stage().unwrap_or(self.stage));
        self.stage = Stage::Rejected;
        self.sequence_number = None;
        self.error_code = Some(err.code().to_string());
        self.error = Some(err.to_string());
        self
    }

    /// Marks this verdict accepted under `sequence_number`
    pub fn registered(mut self, sequence_number: u64) -> Self {
        self.valid = true;
        self.stage = Stage::Registered;
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.stage == Stage::Rejected
    }

    /// Number of codecs tried
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;

    #[test]
    fn test_rejected_records_stage() {
        let verdict = Verdict::received("src")
            .rejected(AnalysisError::InputTooLarge { size: 10, limit: 5 });

        assert!(!verdict.valid);
        assert!(verdict.is_rejected());
        assert_eq!(verdict.rejected_at, Some(Stage::Received));
        assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_INPUT_TOO_LARGE"));
    }

    #[test]
    fn test_internal_fault_keeps_current_stage() {
        let mut verdict = Verdict::received("src");
        verdict.stage = Stage::Verified;
        let verdict = verdict.rejected(AnalysisError::Internal("Lock poisoned".into()));
        assert_eq!(verdict.rejected_at, Some(Stage::Verified));
    }

    #[test]
    fn test_fault_is_internal() {
        let verdict = Verdict::fault("src", "task panicked");
        assert_eq!(verdict.error_code.as_deref(), Some("ARMOR_INTERNAL"));
        assert_eq!(verdict.rejected_at, Some(Stage::Received));
        assert!(verdict.error.unwrap().contains("task panicked"));
    }

    #[test]
    fn test_attempt_summary() {
        let ok = DecodeAttempt {
            codec: CodecKind::Base64,
            outcome: DecodeOutcome::Success(vec![1, 2, 3]),
        };
        let failed = DecodeAttempt {
            codec: CodecKind::Z85,
            outcome: DecodeOutcome::Failure(CodecError::InvalidCharacter {
                ch: '~',
                position: 4,
            }),
        };

        let ok = AttemptSummary::from(&ok);
        assert!(ok.ok);
        assert_eq!(ok.decoded_len, Some(3));

        let failed = AttemptSummary::from(&failed);
        assert!(!failed.ok);
        assert!(failed.reason.is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let verdict = Verdict::received("abc").registered(4);
        let value = serde_json::to_value(&verdict).unwrap();

        assert_eq!(value["valid"], true);
        assert_eq!(value["stage"], "registered");
        assert_eq!(value["sequence_number"], 4);
        assert!(value.get("error").is_none());
        assert!(value["matches"].as_array().unwrap().is_empty());
    }
}
