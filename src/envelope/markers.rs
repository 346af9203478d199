//! Armor marker spellings

use std::fmt;

use serde::Serialize;

/// Normalized envelope type exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    ArmoredContract,
}

/// One recognized start/end marker pair
///
/// Each spelling is matched independently; both normalize to
/// [`EnvelopeKind::ArmoredContract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSpelling {
    Consignment,
    Contract,
}

impl MarkerSpelling {
    pub const ALL: [MarkerSpelling; 2] = [MarkerSpelling::Consignment, MarkerSpelling::Contract];

    pub fn begin_marker(&self) -> &'static str {
        match self {
            MarkerSpelling::Consignment => "-----BEGIN RGB CONSIGNMENT-----",
            MarkerSpelling::Contract => "-----BEGIN RGB CONTRACT-----",
        }
    }

    pub fn end_marker(&self) -> &'static str {
        match self {
            MarkerSpelling::Consignment => "-----END RGB CONSIGNMENT-----",
            MarkerSpelling::Contract => "-----END RGB CONTRACT-----",
        }
    }

    pub fn kind(&self) -> EnvelopeKind {
        EnvelopeKind::ArmoredContract
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerSpelling::Consignment => "CONSIGNMENT",
            MarkerSpelling::Contract => "CONTRACT",
        }
    }
}

impl fmt::Display for MarkerSpelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
