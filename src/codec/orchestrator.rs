//! Decode orchestration
//!
//! Tries each codec against a normalized body in [`CodecKind::PRIORITY`] order.
//! Every attempt is recorded, including the ones that fail, so a rejection can
//! say exactly why each candidate was ruled out.

use serde::{Deserialize, Serialize};

use super::errors::{CodecError, DecodeError, DecodeResult};
use super::CodecKind;

/// How many successes the orchestrator collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Stop at the first codec that parses
    #[default]
    First,
    /// Try every codec and keep all successes
    Exhaustive,
}

/// Tagged outcome of one codec attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Success(Vec<u8>),
    Failure(CodecError),
}

/// One codec tried against one body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    pub codec: CodecKind,
    pub outcome: DecodeOutcome,
}

impl DecodeAttempt {
    /// Decoded bytes, if this attempt succeeded
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.outcome {
            DecodeOutcome::Success(bytes) => Some(bytes),
            DecodeOutcome::Failure(_) => None,
        }
    }

    /// Failure reason, if this attempt failed
    pub fn error(&self) -> Option<&CodecError> {
        match &self.outcome {
            DecodeOutcome::Success(_) => None,
            DecodeOutcome::Failure(err) => Some(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DecodeOutcome::Success(_))
    }
}

/// All attempts made for one body; holds at least one success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    mode: DecodeMode,
    attempts: Vec<DecodeAttempt>,
}

impl DecodeReport {
    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Every attempt in the order tried
    pub fn attempts(&self) -> &[DecodeAttempt] {
        &self.attempts
    }

    /// Successful decodes in priority order
    pub fn successes(&self) -> impl Iterator<Item = (CodecKind, &[u8])> {
        self.attempts
            .iter()
            .filter_map(|a| a.bytes().map(|bytes| (a.codec, bytes)))
    }

    /// The highest-priority successful decode
    pub fn first_success(&self) -> Option<(CodecKind, &[u8])> {
        self.successes().next()
    }

    /// True when more than one codec parsed the body
    pub fn is_ambiguous(&self) -> bool {
        self.successes().nth(1).is_some()
    }
}

/// Runs the codec registry against envelope bodies
#[derive(Debug, Clone)]
pub struct DecodeOrchestrator {
    codecs: Vec<CodecKind>,
    mode: DecodeMode,
}

impl DecodeOrchestrator {
    /// All codecs, in priority order
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            codecs: CodecKind::PRIORITY.to_vec(),
            mode,
        }
    }

    /// A subset of codecs; they are still tried in priority order
    pub fn with_codecs(codecs: &[CodecKind], mode: DecodeMode) -> Self {
        let codecs = CodecKind::PRIORITY
            .into_iter()
            .filter(|codec| codecs.contains(codec))
            .collect();
        Self { codecs, mode }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn codecs(&self) -> &[CodecKind] {
        &self.codecs
    }

    /// Decodes with this orchestrator's configured mode
    pub fn decode(&self, body: &str) -> DecodeResult<DecodeReport> {
        self.decode_with(body, self.mode)
    }

    /// Decodes with an explicit mode
    pub fn decode_with(&self, body: &str, mode: DecodeMode) -> DecodeResult<DecodeReport> {
        let mut attempts = Vec::with_capacity(self.codecs.len());

        for &codec in &self.codecs {
            let outcome = match attempt(codec, body) {
                Ok(bytes) => DecodeOutcome::Success(bytes),
                Err(err) => DecodeOutcome::Failure(err),
            };
            let succeeded = matches!(outcome, DecodeOutcome::Success(_));
            attempts.push(DecodeAttempt { codec, outcome });

            if succeeded && mode == DecodeMode::First {
                break;
            }
        }

        if attempts.iter().any(DecodeAttempt::is_success) {
            return Ok(DecodeReport { mode, attempts });
        }

        let failures = attempts
            .into_iter()
            .filter_map(|a| match a.outcome {
                DecodeOutcome::Failure(err) => Some((a.codec, err)),
                DecodeOutcome::Success(_) => None,
            })
            .collect();
        Err(DecodeError::NoCodecMatched { failures })
    }
}

impl Default for DecodeOrchestrator {
    fn default() -> Self {
        Self::new(DecodeMode::First)
    }
}

fn attempt(codec: CodecKind, body: &str) -> Result<Vec<u8>, CodecError> {
    let prepared = codec.prepare(body);
    codec.precheck(&prepared)?;
    codec.decode(&prepared)
}
