//! Known embedded asset signatures

use serde::{Deserialize, Serialize};

/// Broad class of an embedded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureCategory {
    Image,
}

/// Magic bytes that open a known asset type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub label: &'static str,
    pub pattern: &'static [u8],
    pub category: SignatureCategory,
    /// Lowest offset at which a match is accepted
    pub min_offset: usize,
    /// Highest offset at which a match is accepted; `None` for anywhere
    pub max_offset: Option<usize>,
}

impl Signature {
    /// Whether a match at `offset` falls inside this signature's window
    pub fn admits(&self, offset: usize) -> bool {
        offset >= self.min_offset && self.max_offset.map_or(true, |max| offset <= max)
    }
}

/// JPEG start-of-image followed by the first marker prefix
pub const JPEG: Signature = Signature {
    label: "jpeg",
    pattern: &[0xFF, 0xD8, 0xFF],
    category: SignatureCategory::Image,
    min_offset: 0,
    max_offset: None,
};

/// Full eight-byte PNG file signature
pub const PNG: Signature = Signature {
    label: "png",
    pattern: &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    category: SignatureCategory::Image,
    min_offset: 0,
    max_offset: None,
};

/// The default catalog; its order breaks ties between matches at one offset
pub static CATALOG: &[Signature] = &[JPEG, PNG];

/// Looks up a catalog entry by label
pub fn by_label(label: &str) -> Option<&'static Signature> {
    CATALOG.iter().find(|s| s.label == label)
}
