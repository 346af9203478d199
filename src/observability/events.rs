//! Observable events for armorscan
//!
//! Events are explicit and typed. Each maps to one stable log event name.

use std::fmt;

use super::logger::Severity;

/// Observable events in armorscan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Analysis
    /// Input accepted for analysis
    InputReceived,
    /// Input refused before any work
    InputRejected,
    /// Envelope markers found
    EnvelopeLocated,
    /// No complete marker pair
    EnvelopeMissing,
    /// A codec produced bytes
    DecodeSucceeded,
    /// Every codec failed
    CodecExhausted,
    /// Signature found in decoded bytes
    SignatureMatched,
    /// No signature in decoded bytes
    SignatureMissing,
    /// Declared checksum differs from the decoded bytes
    ChecksumMismatch,
    /// Discovery appended to the registry
    DiscoveryRegistered,
    /// Analysis aborted on an internal fault
    AnalysisFault,

    // Batch scan
    /// Scan over a file set begins
    ScanStart,
    /// Scan over a file set complete
    ScanComplete,
    /// Registry export written
    ExportWritten,

    // Server
    /// Server serving (ready for requests)
    Serving,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::InputReceived => "INPUT_RECEIVED",
            Event::InputRejected => "INPUT_REJECTED",
            Event::EnvelopeLocated => "ENVELOPE_LOCATED",
            Event::EnvelopeMissing => "ENVELOPE_MISSING",
            Event::DecodeSucceeded => "DECODE_SUCCEEDED",
            Event::CodecExhausted => "CODEC_EXHAUSTED",
            Event::SignatureMatched => "SIGNATURE_MATCHED",
            Event::SignatureMissing => "SIGNATURE_MISSING",
            Event::ChecksumMismatch => "CHECKSUM_MISMATCH",
            Event::DiscoveryRegistered => "DISCOVERY_REGISTERED",
            Event::AnalysisFault => "ANALYSIS_FAULT",

            Event::ScanStart => "SCAN_BEGIN",
            Event::ScanComplete => "SCAN_COMPLETE",
            Event::ExportWritten => "EXPORT_WRITTEN",

            Event::Serving => "ARMORSCAN_SERVING",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::InputReceived | Event::EnvelopeLocated | Event::DecodeSucceeded => {
                Severity::Trace
            }
            Event::InputRejected
            | Event::EnvelopeMissing
            | Event::CodecExhausted
            | Event::SignatureMissing
            | Event::ChecksumMismatch => Severity::Warn,
            Event::AnalysisFault => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
