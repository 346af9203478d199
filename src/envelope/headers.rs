//! Armor header block
//!
//! An envelope body may open with `Key: value` lines terminated by a blank
//! line. Decoding ignores them; they are carried into verdicts and registry
//! records.

use std::sync::OnceLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

static HEADER_LINE: OnceLock<Option<Regex>> = OnceLock::new();

fn header_line() -> Option<&'static Regex> {
    HEADER_LINE
        .get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*):(?:[ \t]+(.*))?$").ok())
        .as_ref()
}

/// Ordered `Key: value` pairs from an armor header block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmorHeaders {
    entries: Vec<(String, String)>,
}

impl ArmorHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a leading header block off `text`.
    ///
    /// Returns the parsed headers and the remainder after the blank line. If
    /// the leading lines are not all headers, or no blank line terminates
    /// them, nothing is split off.
    pub fn split(text: &str) -> (ArmorHeaders, &str) {
        let Some(pattern) = header_line() else {
            return (ArmorHeaders::default(), text);
        };

        let mut entries = Vec::new();
        let mut consumed = 0;

        for line in text.split_inclusive('\n') {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                consumed += line.len();
                if !entries.is_empty() {
                    return (ArmorHeaders { entries }, &text[consumed..]);
                }
                continue;
            }

            match pattern.captures(trimmed) {
                Some(caps) => {
                    let key = caps.get(1).map_or("", |m| m.as_str());
                    let value = caps.get(2).map_or("", |m| m.as_str().trim());
                    entries.push((key.to_string(), value.to_string()));
                    consumed += line.len();
                }
                None => break,
            }
        }

        (ArmorHeaders::default(), text)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value for `key`, case-insensitive
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn id(&self) -> Option<&str> {
        self.get("Id")
    }

    /// Contract id: `Contract`, falling back to a non-consignment `Id`
    pub fn contract_id(&self) -> Option<&str> {
        self.get("Contract")
            .or_else(|| self.id().filter(|id| !id.starts_with("rgb:csg")))
    }

    /// Consignment id: an `Id` in the `rgb:csg` namespace
    pub fn consignment_id(&self) -> Option<&str> {
        self.id().filter(|id| id.starts_with("rgb:csg"))
    }

    pub fn contract_type(&self) -> Option<&str> {
        self.get("Type")
    }

    pub fn schema(&self) -> Option<&str> {
        self.get("Schema")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("Version")
    }

    /// Declared SHA-256 of the decoded payload
    pub fn checksum(&self) -> Option<&str> {
        self.get("Check-SHA256")
    }

    pub fn description(&self) -> Option<&str> {
        self.get("Description")
    }

    pub fn supply(&self) -> Option<u64> {
        self.get("Supply")
            .and_then(|v| v.replace('_', "").parse().ok())
    }
}

impl Serialize for ArmorHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
