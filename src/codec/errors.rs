//! Codec errors

use thiserror::Error;

use super::CodecKind;

/// Result type for a single codec operation
pub type CodecResult<T> = Result<T, CodecError>;

/// Why a single codec rejected an envelope body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    #[error("invalid length {len}: {reason}")]
    InvalidLength { len: usize, reason: &'static str },

    #[error("group starting at position {position} exceeds 32 bits")]
    GroupOverflow { position: usize },

    #[error("'z' shorthand inside a partial group at position {position}")]
    MisplacedZero { position: usize },

    #[error("missing {0} frame marker")]
    MissingFrame(&'static str),

    #[error("ascii85: {0}")]
    Ascii85(String),

    #[error("z85: {0}")]
    Z85(String),

    #[error("base64: {0}")]
    Base64(String),
}

impl From<base64::DecodeError> for CodecError {
    fn from(e: base64::DecodeError) -> Self {
        CodecError::Base64(e.to_string())
    }
}

/// Result type for orchestrated decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Every candidate codec rejected the body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no codec matched ({})", describe_failures(.failures))]
    NoCodecMatched { failures: Vec<(CodecKind, CodecError)> },
}

impl DecodeError {
    /// Per-codec failure reasons, in the order the codecs were tried
    pub fn failures(&self) -> &[(CodecKind, CodecError)] {
        match self {
            DecodeError::NoCodecMatched { failures } => failures,
        }
    }
}

fn describe_failures(failures: &[(CodecKind, CodecError)]) -> String {
    if failures.is_empty() {
        return "no codecs configured".to_string();
    }
    failures
        .iter()
        .map(|(codec, err)| format!("{}: {}", codec, err))
        .collect::<Vec<_>>()
        .join("; ")
}
