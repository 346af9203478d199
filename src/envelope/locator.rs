//! Envelope location and body normalization

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

use super::headers::ArmorHeaders;
use super::markers::{EnvelopeKind, MarkerSpelling};

/// A located envelope, borrowed from its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    source: &'a str,
    spelling: MarkerSpelling,
    marker_span: Range<usize>,
    body_span: Range<usize>,
}

impl<'a> Envelope<'a> {
    pub fn spelling(&self) -> MarkerSpelling {
        self.spelling
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.spelling.kind()
    }

    /// From the first byte of the start marker to the last byte of the end marker
    pub fn marker_span(&self) -> Range<usize> {
        self.marker_span.clone()
    }

    /// Text strictly between the two markers
    pub fn body_span(&self) -> Range<usize> {
        self.body_span.clone()
    }

    /// The raw region between the markers, headers and whitespace included
    pub fn raw_body(&self) -> &'a str {
        &self.source[self.body_span.clone()]
    }

    /// Splits the region into its header block and whitespace-free payload text
    pub fn sections(&self) -> EnvelopeSections {
        let region = unescape_transport(self.raw_body());
        let (headers, payload) = ArmorHeaders::split(&region);
        EnvelopeSections {
            headers,
            body: strip_whitespace(payload),
        }
    }

    /// Payload text ready for decoding
    pub fn normalized_body(&self) -> String {
        self.sections().body
    }

    pub fn summary(&self) -> EnvelopeSummary {
        EnvelopeSummary {
            kind: self.kind(),
            spelling: self.spelling,
            start: self.marker_span.start,
            end: self.marker_span.end,
        }
    }
}

/// Header block and normalized body of an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeSections {
    pub headers: ArmorHeaders,
    pub body: String,
}

/// Where an envelope sat in its source, for verdicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvelopeSummary {
    pub kind: EnvelopeKind,
    pub spelling: MarkerSpelling,
    pub start: usize,
    pub end: usize,
}

/// First positions of one spelling's markers in a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerObservation {
    pub spelling: MarkerSpelling,
    pub first_begin: Option<usize>,
    pub first_end: Option<usize>,
}

impl MarkerObservation {
    /// An end marker was seen, but only before the start marker
    pub fn is_out_of_order(&self) -> bool {
        matches!((self.first_begin, self.first_end), (Some(begin), Some(end)) if end < begin)
    }
}

/// What the locator saw when no complete pair was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerDiagnostics {
    pub observations: Vec<MarkerObservation>,
}

impl MarkerDiagnostics {
    /// True when any marker of any spelling appeared
    pub fn saw_markers(&self) -> bool {
        self.observations
            .iter()
            .any(|o| o.first_begin.is_some() || o.first_end.is_some())
    }

    /// The first spelling whose end marker precedes its start marker
    pub fn out_of_order(&self) -> Option<&MarkerObservation> {
        self.observations.iter().find(|o| o.is_out_of_order())
    }
}

impl fmt::Display for MarkerDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.saw_markers() {
            return f.write_str("no armor markers present");
        }
        let mut first = true;
        for o in &self.observations {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            let begin = o.first_begin.map_or("absent".to_string(), |p| format!("at {}", p));
            let end = o.first_end.map_or("absent".to_string(), |p| format!("at {}", p));
            write!(f, "{}: begin {}, end {}", o.spelling, begin, end)?;
        }
        Ok(())
    }
}

/// Locator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("no armored envelope found: {0}")]
    NotFound(MarkerDiagnostics),
}

impl LocateError {
    pub fn diagnostics(&self) -> &MarkerDiagnostics {
        match self {
            LocateError::NotFound(diagnostics) => diagnostics,
        }
    }
}

/// Finds armored envelopes in noisy text
#[derive(Debug, Clone)]
pub struct EnvelopeLocator {
    spellings: Vec<MarkerSpelling>,
}

impl EnvelopeLocator {
    pub fn new() -> Self {
        Self {
            spellings: MarkerSpelling::ALL.to_vec(),
        }
    }

    pub fn with_spellings(spellings: &[MarkerSpelling]) -> Self {
        Self {
            spellings: spellings.to_vec(),
        }
    }

    /// The first complete envelope in `text`.
    ///
    /// For each spelling, the first start marker is paired with the first end
    /// marker of the same spelling after it; the pair with the earliest start
    /// wins.
    pub fn locate<'a>(&self, text: &'a str) -> Result<Envelope<'a>, LocateError> {
        self.locate_from(text, 0)
            .ok_or_else(|| LocateError::NotFound(self.diagnose(text)))
    }

    /// Every envelope in `text`, each search resuming after the previous end marker
    pub fn locate_all<'a>(&self, text: &'a str) -> Vec<Envelope<'a>> {
        let mut envelopes = Vec::new();
        let mut cursor = 0;
        while let Some(envelope) = self.locate_from(text, cursor) {
            cursor = envelope.marker_span.end;
            envelopes.push(envelope);
        }
        envelopes
    }

    fn locate_from<'a>(&self, text: &'a str, from: usize) -> Option<Envelope<'a>> {
        let haystack = text.get(from..)?;
        let mut best: Option<Envelope<'a>> = None;

        for &spelling in &self.spellings {
            let begin_marker = spelling.begin_marker();
            let end_marker = spelling.end_marker();

            let Some(begin) = haystack.find(begin_marker).map(|p| p + from) else {
                continue;
            };
            let body_start = begin + begin_marker.len();
            let Some(body_end) = text[body_start..].find(end_marker).map(|p| p + body_start) else {
                continue;
            };

            if best.as_ref().map_or(true, |b| begin < b.marker_span.start) {
                best = Some(Envelope {
                    source: text,
                    spelling,
                    marker_span: begin..body_end + end_marker.len(),
                    body_span: body_start..body_end,
                });
            }
        }

        best
    }

    fn diagnose(&self, text: &str) -> MarkerDiagnostics {
        let observations = self
            .spellings
            .iter()
            .map(|&spelling| MarkerObservation {
                spelling,
                first_begin: text.find(spelling.begin_marker()),
                first_end: text.find(spelling.end_marker()),
            })
            .collect();
        MarkerDiagnostics { observations }
    }
}

impl Default for EnvelopeLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Undoes escaped line breaks in regions stored as a single escaped line.
///
/// Only a region that opens with an escaped line break right after the start
/// marker is treated as escaped: `\` and `n` are both Ascii85 digits, so an
/// inline body may contain them literally.
fn unescape_transport(region: &str) -> Cow<'_, str> {
    let escaped = region.starts_with("\\n") || region.starts_with("\\r\\n");
    if !escaped || region.contains(|c: char| c == '\n' || c == '\r') {
        return Cow::Borrowed(region);
    }
    Cow::Owned(region.replace("\\r\\n", "\n").replace("\\n", "\n"))
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEGIN: &str = "-----BEGIN RGB CONSIGNMENT-----";
    const END: &str = "-----END RGB CONSIGNMENT-----";

    #[test]
    fn test_locates_envelope_in_noise() {
        let text = format!("<html>noise {}\nAB CD\nEF\n{} trailing</html>", BEGIN, END);
        let envelope = EnvelopeLocator::new().locate(&text).unwrap();

        assert_eq!(envelope.spelling(), MarkerSpelling::Consignment);
        assert_eq!(envelope.kind(), EnvelopeKind::ArmoredContract);
        assert_eq!(envelope.raw_body(), "\nAB CD\nEF\n");
        assert_eq!(envelope.normalized_body(), "ABCDEF");
        assert_eq!(envelope.marker_span().start, text.find(BEGIN).unwrap());
        assert!(envelope.body_span().end >= envelope.body_span().start);
    }

    #[test]
    fn test_start_without_end_is_not_found() {
        let text = format!("{}\nABC\n", BEGIN);
        let err = EnvelopeLocator::new().locate(&text).unwrap_err();
        let obs = err.diagnostics().observations[0];
        assert_eq!(obs.first_begin, Some(0));
        assert_eq!(obs.first_end, None);
        assert!(err.diagnostics().out_of_order().is_none());
    }

    #[test]
    fn test_end_before_start_is_not_found() {
        let text = format!("xxxxx{}{}{}ABC", END, " ".repeat(16), BEGIN);
        assert_eq!(text.find(END), Some(5));
        assert_eq!(text.find(BEGIN), Some(50));

        let err = EnvelopeLocator::new().locate(&text).unwrap_err();
        let obs = err.diagnostics().out_of_order().unwrap();
        assert_eq!(obs.spelling, MarkerSpelling::Consignment);
        assert_eq!(obs.first_end, Some(5));
        assert_eq!(obs.first_begin, Some(50));
    }

    #[test]
    fn test_spellings_are_not_mixed() {
        let text = "-----BEGIN RGB CONTRACT-----\nABC\n-----END RGB CONSIGNMENT-----";
        assert!(EnvelopeLocator::new().locate(text).is_err());
    }

    #[test]
    fn test_earliest_start_wins() {
        let text = format!(
            "-----BEGIN RGB CONTRACT-----\nONE\n-----END RGB CONTRACT-----\n{}\nTWO\n{}",
            BEGIN, END
        );
        let envelope = EnvelopeLocator::new().locate(&text).unwrap();
        assert_eq!(envelope.spelling(), MarkerSpelling::Contract);
        assert_eq!(envelope.normalized_body(), "ONE");
    }

    #[test]
    fn test_locate_all_walks_past_each_end() {
        let text = format!(
            "{b}\nONE\n{e}\n-----BEGIN RGB CONTRACT-----\nTWO\n-----END RGB CONTRACT-----\n{b}\nTHREE\n{e}\n{b}\nunterminated",
            b = BEGIN,
            e = END
        );
        let bodies: Vec<_> = EnvelopeLocator::new()
            .locate_all(&text)
            .iter()
            .map(|e| e.normalized_body())
            .collect();
        assert_eq!(bodies, vec!["ONE", "TWO", "THREE"]);
    }

    #[test]
    fn test_headers_stripped_from_body() {
        let text = format!("{}\nId: rgb:csg:1\nType: RGB21\n\nAB\nCD\n{}", BEGIN, END);
        let sections = EnvelopeLocator::new().locate(&text).unwrap().sections();
        assert_eq!(sections.headers.contract_type(), Some("RGB21"));
        assert_eq!(sections.body, "ABCD");
    }

    #[test]
    fn test_escaped_newlines_are_unescaped() {
        let text = format!("{}\\nId: x\\n\\nAB\\nCD\\n{}", BEGIN, END);
        let sections = EnvelopeLocator::new().locate(&text).unwrap().sections();
        assert_eq!(sections.headers.id(), Some("x"));
        assert_eq!(sections.body, "ABCD");
    }

    #[test]
    fn test_inline_body_keeps_literal_backslash_n() {
        let text = "-----BEGIN RGB CONTRACT-----Ag\\n:@Ag\\n-----END RGB CONTRACT-----";
        let sections = EnvelopeLocator::new().locate(text).unwrap().sections();
        assert!(sections.headers.is_empty());
        assert_eq!(sections.body, "Ag\\n:@Ag\\n");
    }

    #[test]
    fn test_no_markers_diagnostics() {
        let err = EnvelopeLocator::new().locate("plain text").unwrap_err();
        assert!(!err.diagnostics().saw_markers());
        assert!(err.to_string().contains("no armor markers present"));
    }
}
