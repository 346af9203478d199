//! armorscan - locate, decode and verify armored contract envelopes
//!
//! An envelope is a marker-delimited, base-85 or base-64 encoded payload
//! embedded in an arbitrary host document. The engine finds it, tries each
//! candidate codec in a fixed priority order, scans the decoded bytes for
//! known asset signatures and records valid discoveries in sequence order.

pub mod analyzer;
pub mod cli;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod http_server;
pub mod observability;
pub mod registry;
pub mod signature;
