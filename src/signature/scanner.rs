//! Signature scanning over decoded buffers
//!
//! The whole buffer is searched for every catalog pattern. Matches borrow
//! nothing: each one records an offset and a span, and callers slice the
//! original buffer with [`Match::sub_payload`].

use std::ops::Range;

use memchr::memmem;
use serde::{Deserialize, Serialize};

use super::catalog::{Signature, SignatureCategory, CATALOG};

/// Where a match's candidate sub-payload ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanBoundary {
    /// The sub-payload runs to the end of the buffer
    #[default]
    BufferEnd,
    /// The sub-payload stops where the next later match begins
    NextMatch,
}

/// One occurrence of a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub label: &'static str,
    pub category: SignatureCategory,
    pub offset: usize,
    span: Range<usize>,
}

impl Match {
    /// Byte range of the candidate sub-payload; always inside the buffer
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// The candidate sub-payload within the scanned buffer
    pub fn sub_payload<'b>(&self, buffer: &'b [u8]) -> &'b [u8] {
        buffer.get(self.span.clone()).unwrap_or(&[])
    }
}

/// Result of scanning one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub matches: Vec<Match>,
    pub signatures_checked: usize,
    pub buffer_len: usize,
}

impl ScanReport {
    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Match offsets in ascending order
    pub fn offsets(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.offset).collect()
    }
}

/// Exact byte-pattern search over a signature catalog
#[derive(Debug, Clone)]
pub struct SignatureScanner<'c> {
    catalog: &'c [Signature],
    boundary: SpanBoundary,
}

impl SignatureScanner<'static> {
    /// Scanner over the default catalog
    pub fn new() -> Self {
        Self::with_catalog(CATALOG)
    }
}

impl Default for SignatureScanner<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> SignatureScanner<'c> {
    pub fn with_catalog(catalog: &'c [Signature]) -> Self {
        Self {
            catalog,
            boundary: SpanBoundary::BufferEnd,
        }
    }

    pub fn with_boundary(mut self, boundary: SpanBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn catalog(&self) -> &'c [Signature] {
        self.catalog
    }

    /// Every signature occurrence in `buffer`, ascending by offset.
    ///
    /// Overlapping occurrences are all reported. Matches at the same offset
    /// are ordered by catalog position.
    pub fn scan(&self, buffer: &[u8]) -> ScanReport {
        let mut hits: Vec<(usize, usize)> = Vec::new();

        for (index, signature) in self.catalog.iter().enumerate() {
            if signature.pattern.is_empty() {
                continue;
            }
            let finder = memmem::Finder::new(signature.pattern);
            let mut cursor = signature.min_offset;

            while cursor < buffer.len() {
                let Some(found) = finder.find(&buffer[cursor..]) else {
                    break;
                };
                let offset = cursor + found;
                if !signature.admits(offset) {
                    break;
                }
                hits.push((offset, index));
                cursor = offset + 1;
            }
        }

        hits.sort_unstable();

        // `next` never moves backward
        let mut next = 0;
        let mut matches = Vec::with_capacity(hits.len());
        for (position, &(offset, index)) in hits.iter().enumerate() {
            let end = match self.boundary {
                SpanBoundary::BufferEnd => buffer.len(),
                SpanBoundary::NextMatch => {
                    next = next.max(position + 1);
                    while next < hits.len() && hits[next].0 <= offset {
                        next += 1;
                    }
                    hits.get(next).map_or(buffer.len(), |&(other, _)| other)
                }
            };
            let signature = &self.catalog[index];
            matches.push(Match {
                label: signature.label,
                category: signature.category,
                offset,
                span: offset..end,
            });
        }

        ScanReport {
            matches,
            signatures_checked: self.catalog.len(),
            buffer_len: buffer.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::catalog::{JPEG, PNG};

    fn plant(len: usize, pattern: &[u8], offsets: &[usize]) -> Vec<u8> {
        let mut buffer = vec![0u8; len];
        for &offset in offsets {
            buffer[offset..offset + pattern.len()].copy_from_slice(pattern);
        }
        buffer
    }

    #[test]
    fn test_finds_every_occurrence() {
        let buffer = plant(1200, JPEG.pattern, &[10, 500, 1000]);
        let report = SignatureScanner::new().scan(&buffer);

        assert_eq!(report.offsets(), vec![10, 500, 1000]);
        assert!(report.matches.iter().all(|m| m.label == "jpeg"));
        assert_eq!(report.signatures_checked, CATALOG.len());
    }

    #[test]
    fn test_sub_payload_runs_to_buffer_end() {
        let buffer = plant(64, PNG.pattern, &[16]);
        let report = SignatureScanner::new().scan(&buffer);

        let m = &report.matches[0];
        assert_eq!(m.span(), 16..64);
        assert_eq!(m.sub_payload(&buffer)[..8], *PNG.pattern);
    }

    #[test]
    fn test_next_match_boundary() {
        let mut buffer = plant(100, JPEG.pattern, &[5]);
        buffer[40..48].copy_from_slice(PNG.pattern);

        let report = SignatureScanner::new()
            .with_boundary(SpanBoundary::NextMatch)
            .scan(&buffer);

        assert_eq!(report.offsets(), vec![5, 40]);
        assert_eq!(report.matches[0].span(), 5..40);
        assert_eq!(report.matches[1].span(), 40..100);
    }

    #[test]
    fn test_next_match_boundary_on_dense_buffer() {
        // FF D8 repeated: a JPEG match starts at every even offset but the last
        let buffer: Vec<u8> = [0xFF, 0xD8].repeat(100_000);
        let report = SignatureScanner::new()
            .with_boundary(SpanBoundary::NextMatch)
            .scan(&buffer);

        assert_eq!(report.matches.len(), 99_999);
        for pair in report.matches.windows(2) {
            assert_eq!(pair[0].span(), pair[0].offset..pair[1].offset);
        }
        let last = report.matches.last().unwrap();
        assert_eq!(last.span(), last.offset..buffer.len());
    }

    #[test]
    fn test_next_match_skips_same_offset_ties() {
        let catalog = [
            JPEG,
            Signature {
                label: "jpeg-prefix",
                pattern: &[0xFF, 0xD8],
                ..JPEG
            },
        ];
        let buffer = plant(40, JPEG.pattern, &[4, 20]);
        let report = SignatureScanner::with_catalog(&catalog)
            .with_boundary(SpanBoundary::NextMatch)
            .scan(&buffer);

        assert_eq!(report.offsets(), vec![4, 4, 20, 20]);
        assert_eq!(report.matches[0].span(), 4..20);
        assert_eq!(report.matches[1].span(), 4..20);
        assert_eq!(report.matches[2].span(), 20..40);
    }

    #[test]
    fn test_overlapping_occurrences_reported() {
        let buffer = [0xFF, 0xD8, 0xFF, 0xD8, 0xFF];
        let report = SignatureScanner::new().scan(&buffer);
        assert_eq!(report.offsets(), vec![0, 2]);
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let report = SignatureScanner::new().scan(&[0u8; 32]);
        assert!(!report.is_match());
        assert_eq!(report.buffer_len, 32);
    }

    #[test]
    fn test_pattern_at_buffer_end() {
        let buffer = plant(10, JPEG.pattern, &[7]);
        let report = SignatureScanner::new().scan(&buffer);
        assert_eq!(report.offsets(), vec![7]);
        assert_eq!(report.matches[0].len(), 3);
    }

    #[test]
    fn test_offset_window_respected() {
        let catalog = [Signature {
            min_offset: 20,
            max_offset: Some(600),
            ..JPEG
        }];
        let buffer = plant(1200, JPEG.pattern, &[10, 500, 1000]);
        let report = SignatureScanner::with_catalog(&catalog).scan(&buffer);
        assert_eq!(report.offsets(), vec![500]);
    }

    #[test]
    fn test_empty_buffer() {
        let report = SignatureScanner::new().scan(&[]);
        assert!(report.matches.is_empty());
    }
}
