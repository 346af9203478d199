//! # Discovery Registry
//!
//! Append-only record of validated envelopes. Sequence numbers are assigned
//! under the same lock that appends the record, so concurrent registrations
//! never share or skip a number.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::errors::{RegistryError, RegistryResult};
use super::record::{DiscoveryRecord, ExportRecord, MatchSummary};
use crate::codec::CodecKind;
use crate::envelope::ArmorHeaders;

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    /// Ascending sequence number
    #[default]
    Arrival,
    /// Descending sequence number
    #[serde(rename = "newest")]
    NewestFirst,
}

#[derive(Debug, Default)]
struct RegistryState {
    records: Vec<DiscoveryRecord>,
    /// Index of the newest record per source
    latest: HashMap<String, usize>,
    /// Every sequence number assigned per source
    history: HashMap<String, Vec<u64>>,
}

/// Registry of validated discoveries
#[derive(Debug, Default)]
pub struct DiscoveryRegistry {
    state: Mutex<RegistryState>,
}

impl DiscoveryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RegistryResult<MutexGuard<'_, RegistryState>> {
        self.state
            .lock()
            .map_err(|_| RegistryError::Internal("Lock poisoned".into()))
    }

    /// Record a discovery and return its sequence number.
    ///
    /// Numbers start at 0 and increase by one per record. Re-registering a
    /// source appends a new record; earlier records are kept as history.
    pub fn record(
        &self,
        source_id: &str,
        codec_used: CodecKind,
        matches: Vec<MatchSummary>,
        headers: ArmorHeaders,
    ) -> RegistryResult<u64> {
        let mut state = self.lock()?;

        let index = state.records.len();
        let sequence_number = index as u64;
        state.records.push(DiscoveryRecord {
            sequence_number,
            source_id: source_id.to_string(),
            codec_used,
            matches,
            headers,
            timestamp: Utc::now(),
        });
        state.latest.insert(source_id.to_string(), index);
        state
            .history
            .entry(source_id.to_string())
            .or_default()
            .push(sequence_number);

        Ok(sequence_number)
    }

    /// Snapshot of all records
    pub fn list(&self, order: ListOrder) -> RegistryResult<Vec<DiscoveryRecord>> {
        let state = self.lock()?;
        let mut records = state.records.clone();
        if order == ListOrder::NewestFirst {
            records.reverse();
        }
        Ok(records)
    }

    /// Snapshot sorted by a caller-supplied rank, ties in arrival order.
    ///
    /// Only the returned view is reordered; stored sequence numbers never change.
    pub fn list_ranked<K, F>(&self, key: F) -> RegistryResult<Vec<DiscoveryRecord>>
    where
        K: Ord,
        F: FnMut(&DiscoveryRecord) -> K,
    {
        let mut records = self.list(ListOrder::Arrival)?;
        records.sort_by_key(key);
        Ok(records)
    }

    /// Record by sequence number
    pub fn get(&self, sequence_number: u64) -> RegistryResult<DiscoveryRecord> {
        let state = self.lock()?;
        usize::try_from(sequence_number)
            .ok()
            .and_then(|index| state.records.get(index))
            .cloned()
            .ok_or(RegistryError::NotFound(sequence_number))
    }

    /// Newest record for a source
    pub fn latest(&self, source_id: &str) -> RegistryResult<Option<DiscoveryRecord>> {
        let state = self.lock()?;
        Ok(state
            .latest
            .get(source_id)
            .and_then(|&index| state.records.get(index))
            .cloned())
    }

    /// Every sequence number assigned to a source, oldest first
    pub fn history(&self, source_id: &str) -> RegistryResult<Vec<u64>> {
        let state = self.lock()?;
        Ok(state.history.get(source_id).cloned().unwrap_or_default())
    }

    pub fn len(&self) -> RegistryResult<usize> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Export rows in arrival order
    pub fn export(&self) -> RegistryResult<Vec<ExportRecord>> {
        let state = self.lock()?;
        Ok(state.records.iter().map(ExportRecord::from).collect())
    }
}
