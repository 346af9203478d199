//! Locate, decode, scan and register
//!
//! An [`Analyzer`] is shared across threads. Everything before registration
//! is pure and runs without locks; the registry append is the only
//! synchronized step.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::config::AnalyzerConfig;
use super::errors::AnalysisError;
use super::strings::extract_printable;
use super::verdict::{AttemptSummary, Candidate, ChecksumReport, Stage, Verdict};
use crate::codec::{CodecKind, DecodeMode, DecodeOrchestrator};
use crate::envelope::{Envelope, EnvelopeLocator};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::registry::{DiscoveryRegistry, MatchSummary};
use crate::signature::{ScanReport, SignatureScanner};

/// A decoded buffer and its scan
struct Scanned<'r> {
    codec: CodecKind,
    bytes: &'r [u8],
    report: ScanReport,
}

/// The detection and decode engine
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    locator: EnvelopeLocator,
    orchestrator: DecodeOrchestrator,
    scanner: SignatureScanner<'static>,
    registry: Arc<DiscoveryRegistry>,
    metrics: Arc<MetricsRegistry>,
}

impl Analyzer {
    /// Analyzer with its own registry and metrics
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_registry(
            config,
            Arc::new(DiscoveryRegistry::new()),
            Arc::new(MetricsRegistry::new()),
        )
    }

    /// Analyzer recording into shared registry and metrics
    pub fn with_registry(
        config: AnalyzerConfig,
        registry: Arc<DiscoveryRegistry>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            locator: EnvelopeLocator::new(),
            orchestrator: DecodeOrchestrator::new(config.decode_mode),
            scanner: SignatureScanner::new().with_boundary(config.span_boundary),
            config,
            registry,
            metrics,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DiscoveryRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Analyzes the first envelope in `input` with the configured decode mode
    pub fn analyze(&self, source_id: &str, input: &[u8]) -> Verdict {
        self.analyze_with_mode(source_id, input, self.config.decode_mode)
    }

    /// Analyzes the first envelope in `input` with an explicit decode mode
    pub fn analyze_with_mode(&self, source_id: &str, input: &[u8], mode: DecodeMode) -> Verdict {
        if input.len() > self.config.max_input_bytes {
            return self.oversized_verdict(source_id, input.len());
        }
        self.received(source_id, input.len());

        let text = String::from_utf8_lossy(input);
        match self.locator.locate(&text) {
            Ok(envelope) => self.process(source_id, &envelope, mode),
            Err(err) => {
                self.metrics.increment_envelopes_missing();
                self.reject(Verdict::received(source_id), AnalysisError::from(err))
            }
        }
    }

    /// Analyzes every envelope in `input` with the configured decode mode
    pub fn analyze_all(&self, source_id: &str, input: &[u8]) -> Vec<Verdict> {
        self.analyze_all_with_mode(source_id, input, self.config.decode_mode)
    }

    /// Analyzes every envelope in `input`, in document order.
    ///
    /// Each envelope gets its own verdict and, when valid, its own sequence
    /// number. An input with no envelope yields a single rejection.
    pub fn analyze_all_with_mode(
        &self,
        source_id: &str,
        input: &[u8],
        mode: DecodeMode,
    ) -> Vec<Verdict> {
        if input.len() > self.config.max_input_bytes {
            return vec![self.oversized_verdict(source_id, input.len())];
        }
        self.received(source_id, input.len());

        let text = String::from_utf8_lossy(input);
        let envelopes = self.locator.locate_all(&text);
        if envelopes.is_empty() {
            self.metrics.increment_envelopes_missing();
            let err = match self.locator.locate(&text) {
                Err(err) => AnalysisError::from(err),
                Ok(_) => AnalysisError::Internal("locator results disagree".into()),
            };
            return vec![self.reject(Verdict::received(source_id), err)];
        }

        envelopes
            .iter()
            .map(|envelope| self.process(source_id, envelope, mode))
            .collect()
    }

    /// Rejection for an input over the size cap; no decoding is attempted
    pub fn oversized_verdict(&self, source_id: &str, size: usize) -> Verdict {
        self.metrics.increment_inputs_received();
        self.metrics.increment_inputs_rejected_size();
        self.reject(
            Verdict::received(source_id),
            AnalysisError::InputTooLarge {
                size,
                limit: self.config.max_input_bytes,
            },
        )
    }

    fn received(&self, source_id: &str, size: usize) {
        self.metrics.increment_inputs_received();
        log_event_with_fields(
            Event::InputReceived,
            &[("source_id", source_id), ("size", &size.to_string())],
        );
    }

    fn process(&self, source_id: &str, envelope: &Envelope<'_>, mode: DecodeMode) -> Verdict {
        let mut verdict = Verdict::received(source_id);
        match self.verify(envelope, mode, &mut verdict) {
            Ok(codec) => self.register(verdict, codec),
            Err(err) => self.reject(verdict, err),
        }
    }

    /// Runs decode and scan for one envelope, filling `verdict` as it goes.
    ///
    /// Returns the codec of the accepted decode.
    fn verify(
        &self,
        envelope: &Envelope<'_>,
        mode: DecodeMode,
        verdict: &mut Verdict,
    ) -> Result<CodecKind, AnalysisError> {
        let summary = envelope.summary();
        self.metrics.increment_envelopes_located();
        log_event_with_fields(
            Event::EnvelopeLocated,
            &[
                ("source_id", &verdict.source_id),
                ("spelling", summary.spelling.as_str()),
                ("start", &summary.start.to_string()),
            ],
        );

        let sections = envelope.sections();
        verdict.stage = Stage::Located;
        verdict.envelope = Some(summary);
        if !sections.headers.is_empty() {
            verdict.headers = Some(sections.headers.clone());
        }

        let outcome = self.orchestrator.decode_with(&sections.body, mode);
        let attempts = match &outcome {
            Ok(report) => report.attempts().len(),
            Err(err) => err.failures().len(),
        };
        self.metrics.add_codec_attempts(attempts as u64);

        let report = match outcome {
            Ok(report) => report,
            Err(err) => {
                self.metrics.increment_codec_exhaustions();
                verdict.attempts = err
                    .failures()
                    .iter()
                    .map(|(codec, reason)| AttemptSummary {
                        codec: *codec,
                        ok: false,
                        decoded_len: None,
                        reason: Some(reason.to_string()),
                    })
                    .collect();
                return Err(err.into());
            }
        };
        verdict.attempts = report.attempts().iter().map(AttemptSummary::from).collect();
        verdict.stage = Stage::Decoded;

        let scanned: Vec<Scanned<'_>> = report
            .successes()
            .map(|(codec, bytes)| Scanned {
                codec,
                bytes,
                report: self.scanner.scan(bytes),
            })
            .collect();

        let primary = scanned
            .iter()
            .find(|s| s.report.is_match())
            .or_else(|| scanned.first())
            .ok_or_else(|| AnalysisError::Internal("decode report without a success".into()))?;

        log_event_with_fields(
            Event::DecodeSucceeded,
            &[
                ("source_id", &verdict.source_id),
                ("codec", primary.codec.name()),
                ("decoded_len", &primary.bytes.len().to_string()),
            ],
        );

        if mode == DecodeMode::Exhaustive {
            verdict.candidates = scanned
                .iter()
                .map(|s| Candidate {
                    codec: s.codec,
                    decoded_len: s.bytes.len(),
                    matches: summarize(&s.report),
                })
                .collect();
        }

        verdict.codec_used = Some(primary.codec);
        verdict.decoded_len = Some(primary.bytes.len());
        verdict.signatures_checked = primary.report.signatures_checked;
        verdict.matches = summarize(&primary.report);
        if self.config.extract_strings {
            verdict.strings = extract_printable(
                primary.bytes,
                self.config.min_string_len,
                self.config.max_strings,
            );
        }
        if let Some(expected) = sections.headers.checksum() {
            let checksum = checksum_report(expected, primary.bytes);
            if !checksum.matches {
                log_event_with_fields(
                    Event::ChecksumMismatch,
                    &[
                        ("source_id", &verdict.source_id),
                        ("expected", &checksum.expected),
                        ("actual", &checksum.actual),
                    ],
                );
            }
            verdict.checksum = Some(checksum);
        }

        if !primary.report.is_match() {
            return Err(AnalysisError::NoSignatureMatch {
                codec: primary.codec,
                decoded_len: primary.bytes.len(),
                signatures_checked: primary.report.signatures_checked,
            });
        }

        self.metrics
            .add_signature_matches(primary.report.matches.len() as u64);
        log_event_with_fields(
            Event::SignatureMatched,
            &[
                ("source_id", &verdict.source_id),
                ("count", &primary.report.matches.len().to_string()),
                ("first_offset", &primary.report.matches[0].offset.to_string()),
            ],
        );
        verdict.stage = Stage::Verified;

        Ok(primary.codec)
    }

    fn register(&self, verdict: Verdict, codec: CodecKind) -> Verdict {
        let headers = verdict.headers.clone().unwrap_or_default();
        match self
            .registry
            .record(&verdict.source_id, codec, verdict.matches.clone(), headers)
        {
            Ok(sequence_number) => {
                self.metrics.increment_discoveries_registered();
                self.metrics.increment_verdicts_valid();
                log_event_with_fields(
                    Event::DiscoveryRegistered,
                    &[
                        ("source_id", &verdict.source_id),
                        ("sequence_number", &sequence_number.to_string()),
                        ("codec", codec.name()),
                    ],
                );
                verdict.registered(sequence_number)
            }
            Err(err) => {
                let mut verdict = verdict;
                verdict.stage = Stage::Registered;
                self.reject(verdict, err.into())
            }
        }
    }

    fn reject(&self, verdict: Verdict, err: AnalysisError) -> Verdict {
        self.metrics.increment_verdicts_rejected();

        let event = match &err {
            AnalysisError::EnvelopeNotFound(_) | AnalysisError::MalformedMarkerOrder(_) => {
                Event::EnvelopeMissing
            }
            AnalysisError::CodecExhausted(_) => Event::CodecExhausted,
            AnalysisError::NoSignatureMatch { .. } => Event::SignatureMissing,
            AnalysisError::InputTooLarge { .. } => Event::InputRejected,
            AnalysisError::Internal(_) => Event::AnalysisFault,
        };
        log_event_with_fields(
            event,
            &[
                ("source_id", &verdict.source_id),
                ("code", err.code()),
                ("reason", &err.to_string()),
            ],
        );

        verdict.rejected(err)
    }
}

fn summarize(report: &ScanReport) -> Vec<MatchSummary> {
    report.matches.iter().map(MatchSummary::from).collect()
}

fn checksum_report(expected: &str, bytes: &[u8]) -> ChecksumReport {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let actual = format!("{:x}", hasher.finalize());
    let expected = expected.trim().to_string();
    ChecksumReport {
        matches: expected.eq_ignore_ascii_case(&actual),
        expected,
        actual,
    }
}
