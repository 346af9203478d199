//! # Discovery Registry
//!
//! In-memory, append-only store of validated envelopes, and the export rows
//! derived from it.

mod discovery;
mod errors;
mod record;

pub use discovery::{DiscoveryRegistry, ListOrder};
pub use errors::{RegistryError, RegistryResult};
pub use record::{DiscoveryRecord, ExportRecord, MatchSummary};
