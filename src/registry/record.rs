//! # Discovery Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::CodecKind;
use crate::envelope::ArmorHeaders;
use crate::signature::{Match, SignatureCategory};

/// A signature match as stored in records and verdicts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub label: String,
    pub category: SignatureCategory,
    pub offset: usize,
    /// Length of the candidate sub-payload
    pub length: usize,
}

impl From<&Match> for MatchSummary {
    fn from(m: &Match) -> Self {
        Self {
            label: m.label.to_string(),
            category: m.category,
            offset: m.offset,
            length: m.len(),
        }
    }
}

/// One validated envelope, in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryRecord {
    pub sequence_number: u64,
    pub source_id: String,
    pub codec_used: CodecKind,
    pub matches: Vec<MatchSummary>,
    pub headers: ArmorHeaders,
    pub timestamp: DateTime<Utc>,
}

impl DiscoveryRecord {
    /// Classification tag: the `Type` header, else the first match's label
    pub fn classification(&self) -> Option<String> {
        self.headers
            .contract_type()
            .map(str::to_string)
            .or_else(|| self.matches.first().map(|m| m.label.clone()))
    }

    /// Free-text description: the `Description` header, else a generated one
    pub fn description(&self) -> String {
        if let Some(text) = self.headers.description() {
            return text.to_string();
        }
        let found = self
            .matches
            .iter()
            .map(|m| format!("{} at offset {}", m.label, m.offset))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", found, self.codec_used)
    }
}

/// Registry export row
///
/// Field names follow the index format consumed by the explorer front end.
/// `codec_used` and `matches` are carried alongside so a `Description`
/// header never hides how the payload was decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub rgb_number: u64,
    pub inscription_id: String,
    pub contract_type: Option<String>,
    pub description: String,
    pub supply: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub codec_used: CodecKind,
    pub matches: Vec<MatchSummary>,
}

impl From<&DiscoveryRecord> for ExportRecord {
    fn from(record: &DiscoveryRecord) -> Self {
        Self {
            rgb_number: record.sequence_number,
            inscription_id: record.source_id.clone(),
            contract_type: record.classification(),
            description: record.description(),
            supply: record.headers.supply(),
            created_at: record.timestamp,
            codec_used: record.codec_used,
            matches: record.matches.clone(),
        }
    }
}
