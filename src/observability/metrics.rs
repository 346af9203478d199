//! Metrics registry
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Lock-free: one `AtomicU64` per counter

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the analysis pipeline
///
/// Uses Relaxed ordering; counters are independent of each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    inputs_received: AtomicU64,
    inputs_rejected_size: AtomicU64,
    envelopes_located: AtomicU64,
    envelopes_missing: AtomicU64,
    /// One per codec tried, successful or not
    codec_attempts: AtomicU64,
    codec_exhaustions: AtomicU64,
    signature_matches: AtomicU64,
    verdicts_valid: AtomicU64,
    verdicts_rejected: AtomicU64,
    discoveries_registered: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_inputs_received(&self) {
        self.inputs_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_inputs_rejected_size(&self) {
        self.inputs_rejected_size.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_envelopes_located(&self) {
        self.envelopes_located.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_envelopes_missing(&self) {
        self.envelopes_missing.fetch_add(1, Ordering::Relaxed);
    }

    /// Add the number of codecs tried for one body
    pub fn add_codec_attempts(&self, attempts: u64) {
        self.codec_attempts.fetch_add(attempts, Ordering::Relaxed);
    }

    pub fn increment_codec_exhaustions(&self) {
        self.codec_exhaustions.fetch_add(1, Ordering::Relaxed);
    }

    /// Add the number of signature matches in one buffer
    pub fn add_signature_matches(&self, matches: u64) {
        self.signature_matches.fetch_add(matches, Ordering::Relaxed);
    }

    pub fn increment_verdicts_valid(&self) {
        self.verdicts_valid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_verdicts_rejected(&self) {
        self.verdicts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_discoveries_registered(&self) {
        self.discoveries_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Total codec attempts so far
    pub fn codec_attempts(&self) -> u64 {
        self.codec_attempts.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inputs_received: self.inputs_received.load(Ordering::Relaxed),
            inputs_rejected_size: self.inputs_rejected_size.load(Ordering::Relaxed),
            envelopes_located: self.envelopes_located.load(Ordering::Relaxed),
            envelopes_missing: self.envelopes_missing.load(Ordering::Relaxed),
            codec_attempts: self.codec_attempts.load(Ordering::Relaxed),
            codec_exhaustions: self.codec_exhaustions.load(Ordering::Relaxed),
            signature_matches: self.signature_matches.load(Ordering::Relaxed),
            verdicts_valid: self.verdicts_valid.load(Ordering::Relaxed),
            verdicts_rejected: self.verdicts_rejected.load(Ordering::Relaxed),
            discoveries_registered: self.discoveries_registered.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub inputs_received: u64,
    pub inputs_rejected_size: u64,
    pub envelopes_located: u64,
    pub envelopes_missing: u64,
    pub codec_attempts: u64,
    pub codec_exhaustions: u64,
    pub signature_matches: u64,
    pub verdicts_valid: u64,
    pub verdicts_rejected: u64,
    pub discoveries_registered: u64,
}
