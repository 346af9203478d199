//! Embedded asset signatures and the scanner that finds them

pub mod catalog;
mod scanner;

pub use catalog::{Signature, SignatureCategory, CATALOG};
pub use scanner::{Match, ScanReport, SignatureScanner, SpanBoundary};
