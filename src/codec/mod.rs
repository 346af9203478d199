//! Candidate binary-to-text codecs for armored envelope bodies
//!
//! Codecs are plain data: a [`CodecKind`] names one variant and dispatches to
//! pure encode/decode functions. [`CodecKind::PRIORITY`] is the fixed order in
//! which the [`DecodeOrchestrator`] tries them; the order never depends on the
//! input.
//!
//! | Priority | Name            | Alphabet                                   |
//! |----------|-----------------|--------------------------------------------|
//! | 1        | `ascii85`       | `!`..`u`, `z` for four zero bytes          |
//! | 2        | `ascii85-adobe` | as above, framed by `<~` and `~>`          |
//! | 3        | `base85-rfc`    | RFC 1924                                   |
//! | 4        | `z85`           | ZeroMQ Z85                                 |
//! | 5        | `base64`        | standard alphabet with padding             |

mod base85;
mod errors;
mod orchestrator;

pub use errors::{CodecError, CodecResult, DecodeError, DecodeResult};
pub use orchestrator::{DecodeAttempt, DecodeMode, DecodeOrchestrator, DecodeOutcome, DecodeReport};

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const ADOBE_PREFIX: &str = "<~";
const ADOBE_SUFFIX: &str = "~>";

/// One candidate binary-to-text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecKind {
    #[serde(rename = "ascii85")]
    Ascii85,
    #[serde(rename = "ascii85-adobe")]
    Ascii85Adobe,
    #[serde(rename = "base85-rfc")]
    Base85Rfc,
    #[serde(rename = "z85")]
    Z85,
    #[serde(rename = "base64")]
    Base64,
}

impl CodecKind {
    /// Declared priority order
    pub const PRIORITY: [CodecKind; 5] = [
        CodecKind::Ascii85,
        CodecKind::Ascii85Adobe,
        CodecKind::Base85Rfc,
        CodecKind::Z85,
        CodecKind::Base64,
    ];

    /// Stable codec name, as reported in verdicts
    pub fn name(&self) -> &'static str {
        match self {
            CodecKind::Ascii85 => "ascii85",
            CodecKind::Ascii85Adobe => "ascii85-adobe",
            CodecKind::Base85Rfc => "base85-rfc",
            CodecKind::Z85 => "z85",
            CodecKind::Base64 => "base64",
        }
    }

    /// Position in [`CodecKind::PRIORITY`]
    pub fn priority(&self) -> usize {
        match self {
            CodecKind::Ascii85 => 0,
            CodecKind::Ascii85Adobe => 1,
            CodecKind::Base85Rfc => 2,
            CodecKind::Z85 => 3,
            CodecKind::Base64 => 4,
        }
    }

    /// Adapts a normalized body to this codec's framing convention.
    ///
    /// Only the Adobe variant needs this: its decoder requires the `<~ ~>`
    /// wrapper, which envelopes usually omit.
    pub fn prepare<'a>(&self, body: &'a str) -> Cow<'a, str> {
        match self {
            CodecKind::Ascii85Adobe => {
                let has_prefix = body.starts_with(ADOBE_PREFIX);
                let has_suffix =
                    body.ends_with(ADOBE_SUFFIX) && (!has_prefix || body.len() >= 4);
                if has_prefix && has_suffix {
                    return Cow::Borrowed(body);
                }
                let mut framed = String::with_capacity(body.len() + 4);
                if !has_prefix {
                    framed.push_str(ADOBE_PREFIX);
                }
                framed.push_str(body);
                if !has_suffix {
                    framed.push_str(ADOBE_SUFFIX);
                }
                Cow::Owned(framed)
            }
            _ => Cow::Borrowed(body),
        }
    }

    /// Cheap validity check: alphabet membership and structural length
    pub fn precheck(&self, body: &str) -> CodecResult<()> {
        match self {
            CodecKind::Ascii85 => base85::check_ascii85_groups(body),
            CodecKind::Ascii85Adobe => {
                let inner = strip_adobe_frame(body)?;
                base85::check_ascii85_groups(inner)
                    .map_err(|e| shift_position(e, ADOBE_PREFIX.len()))
            }
            CodecKind::Base85Rfc => {
                base85::check_alphabet(body, &base85::RFC1924, b"")?;
                base85::check_length(body.len())
            }
            CodecKind::Z85 => {
                base85::check_alphabet(body, &base85::Z85, b"")?;
                base85::check_length(body.len())
            }
            CodecKind::Base64 => check_base64(body),
        }
    }

    /// Decodes a prepared body
    pub fn decode(&self, body: &str) -> CodecResult<Vec<u8>> {
        match self {
            CodecKind::Ascii85 => decode_ascii85(body),
            CodecKind::Ascii85Adobe => decode_ascii85(strip_adobe_frame(body)?),
            CodecKind::Base85Rfc => base85::decode(body, &base85::RFC1924),
            CodecKind::Z85 => z85::decode(body).map_err(|e| CodecError::Z85(e.to_string())),
            CodecKind::Base64 => Ok(STANDARD.decode(body)?),
        }
    }

    /// Encodes `data`; the inverse of [`CodecKind::decode`]
    pub fn encode(&self, data: &[u8]) -> String {
        match self {
            CodecKind::Ascii85 => encode_ascii85(data),
            CodecKind::Ascii85Adobe => {
                format!("{}{}{}", ADOBE_PREFIX, encode_ascii85(data), ADOBE_SUFFIX)
            }
            CodecKind::Base85Rfc => base85::encode(data, &base85::RFC1924),
            CodecKind::Z85 => z85::encode(data),
            CodecKind::Base64 => STANDARD.encode(data),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodecKind::PRIORITY
            .into_iter()
            .find(|codec| codec.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown codec: {}", s))
    }
}

/// Unframed Ascii85 text; the crate's `<~ ~>` wrapper is removed when present
fn encode_ascii85(data: &[u8]) -> String {
    let text = ascii85::encode(data);
    match text
        .strip_prefix(ADOBE_PREFIX)
        .and_then(|rest| rest.strip_suffix(ADOBE_SUFFIX))
    {
        Some(inner) => inner.to_string(),
        None => text,
    }
}

/// Decodes unframed Ascii85 digits
///
/// The crate is handed the framed form first and the bare digits if it
/// refuses the frame.
fn decode_ascii85(digits: &str) -> CodecResult<Vec<u8>> {
    base85::check_ascii85_groups(digits)?;
    let framed = format!("{}{}{}", ADOBE_PREFIX, digits, ADOBE_SUFFIX);
    ascii85::decode(&framed)
        .or_else(|_| ascii85::decode(digits))
        .map_err(|e| CodecError::Ascii85(e.to_string()))
}

fn strip_adobe_frame(body: &str) -> CodecResult<&str> {
    let rest = body
        .strip_prefix(ADOBE_PREFIX)
        .ok_or(CodecError::MissingFrame(ADOBE_PREFIX))?;
    rest.strip_suffix(ADOBE_SUFFIX)
        .ok_or(CodecError::MissingFrame(ADOBE_SUFFIX))
}

fn shift_position(err: CodecError, by: usize) -> CodecError {
    match err {
        CodecError::InvalidCharacter { ch, position } => CodecError::InvalidCharacter {
            ch,
            position: position + by,
        },
        CodecError::GroupOverflow { position } => CodecError::GroupOverflow {
            position: position + by,
        },
        CodecError::MisplacedZero { position } => CodecError::MisplacedZero {
            position: position + by,
        },
        other => other,
    }
}

fn check_base64(body: &str) -> CodecResult<()> {
    let data = body.trim_end_matches('=');
    if body.len() - data.len() > 2 {
        return Err(CodecError::InvalidLength {
            len: body.len(),
            reason: "more than two padding characters",
        });
    }
    if let Some(position) = data
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'+' || b == b'/'))
    {
        let ch = data[position..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(CodecError::InvalidCharacter { ch, position });
    }
    if body.len() % 4 != 0 {
        return Err(CodecError::InvalidLength {
            len: body.len(),
            reason: "base64 length must be a multiple of 4",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_matches_declared_order() {
        for (index, codec) in CodecKind::PRIORITY.iter().enumerate() {
            assert_eq!(codec.priority(), index);
        }
    }

    #[test]
    fn test_names_roundtrip_through_from_str() {
        for codec in CodecKind::PRIORITY {
            assert_eq!(codec.name().parse::<CodecKind>().unwrap(), codec);
        }
        assert!("base32".parse::<CodecKind>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for codec in CodecKind::PRIORITY {
            let json = serde_json::to_string(&codec).unwrap();
            assert_eq!(json, format!("\"{}\"", codec));
        }
    }

    #[test]
    fn test_adobe_prepare_adds_missing_frame() {
        let codec = CodecKind::Ascii85Adobe;
        assert_eq!(codec.prepare("87cURD]i"), "<~87cURD]i~>");
        assert_eq!(codec.prepare("<~87cURD]i~>"), "<~87cURD]i~>");
        assert_eq!(codec.prepare("<~87cURD]i"), "<~87cURD]i~>");
        assert_eq!(codec.prepare(""), "<~~>");
        assert_eq!(CodecKind::Ascii85.prepare("abc"), "abc");
    }

    #[test]
    fn test_adobe_requires_frame() {
        let err = CodecKind::Ascii85Adobe.decode("87cURD]i").unwrap_err();
        assert_eq!(err, CodecError::MissingFrame("<~"));
        let err = CodecKind::Ascii85Adobe.decode("<~87cURD]i").unwrap_err();
        assert_eq!(err, CodecError::MissingFrame("~>"));
    }

    #[test]
    fn test_adobe_error_positions_refer_to_framed_body() {
        let err = CodecKind::Ascii85Adobe.precheck("<~ab{c~>").unwrap_err();
        assert_eq!(err, CodecError::InvalidCharacter { ch: '{', position: 4 });
    }

    #[test]
    fn test_plain_ascii85_rejects_adobe_frame() {
        let framed = CodecKind::Ascii85Adobe.encode(b"hello");
        assert!(CodecKind::Ascii85.precheck(&framed).is_err());
        assert_eq!(CodecKind::Ascii85Adobe.decode(&framed).unwrap(), b"hello");
    }

    #[test]
    fn test_base64_precheck() {
        assert!(CodecKind::Base64.precheck("aGVsbG8gd29ybGQ=").is_ok());
        assert!(CodecKind::Base64.precheck("aGVsbG8gd29ybGQ").is_err());
        assert!(CodecKind::Base64.precheck("aGVs===").is_err());
        assert!(matches!(
            CodecKind::Base64.precheck("aGV~"),
            Err(CodecError::InvalidCharacter { ch: '~', position: 3 })
        ));
        assert_eq!(
            CodecKind::Base64.decode("aGVsbG8gd29ybGQ=").unwrap(),
            b"hello world"
        );
    }

    #[test]
    fn test_rfc_and_z85_reject_lone_digit() {
        assert!(CodecKind::Base85Rfc.precheck("000000").is_err());
        assert!(CodecKind::Z85.precheck("000000").is_err());
        assert!(CodecKind::Base85Rfc.precheck("0000000").is_ok());
    }

    #[test]
    fn test_every_codec_roundtrips_sample() {
        let data: Vec<u8> = (0u8..=255).collect();
        for codec in CodecKind::PRIORITY {
            let text = codec.encode(&data);
            codec.precheck(&text).unwrap();
            assert_eq!(codec.decode(&text).unwrap(), data, "codec {}", codec);
        }
    }
}
