//! Armored envelope detection
//!
//! An envelope is a text region delimited by a start and an end marker line,
//! wrapping a binary payload encoded as printable text:
//!
//! ```text
//! -----BEGIN RGB CONSIGNMENT-----
//! Id: rgb:csg:...
//! Type: RGB21
//!
//! 0000000950<H~3E88JNLNn7Na7n^2<z)v1nDL0rX&VT8Y&e6wHcxeCt000dDb8~4rVQz13d2M
//! ...
//! -----END RGB CONSIGNMENT-----
//! ```
//!
//! Body lines are wrapped for transport only; all whitespace is stripped
//! before decoding.

mod headers;
mod locator;
mod markers;

pub use headers::ArmorHeaders;
pub use locator::{
    Envelope, EnvelopeLocator, EnvelopeSections, EnvelopeSummary, LocateError, MarkerDiagnostics,
    MarkerObservation,
};
pub use markers::{EnvelopeKind, MarkerSpelling};
