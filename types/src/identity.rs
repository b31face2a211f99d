//! Visitor identifiers: the government identity number typed at intake, and
//! the record id minted when a visit is finalized.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of trailing characters used as the visitor-history lookup key.
pub const LOOKUP_KEY_LEN: usize = 4;

/// The identity-document number a visitor enters at the kiosk.
///
/// Only the last [`LOOKUP_KEY_LEN`] characters are used to look the visitor
/// up; the full value is carried into the record but never logged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityNumber(String);

impl IdentityNumber {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The trailing characters used for history and blocklist lookups.
    /// Shorter numbers are used whole.
    pub fn lookup_key(&self) -> &str {
        let skip = self.0.chars().count().saturating_sub(LOOKUP_KEY_LEN);
        match self.0.char_indices().nth(skip) {
            Some((idx, _)) => &self.0[idx..],
            None => "",
        }
    }

    /// Masked form for logs, e.g. `****9876`.
    pub fn masked(&self) -> String {
        format!("****{}", self.lookup_key())
    }
}

impl fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Unique identifier of a finalized visitor record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(String);

impl VisitorId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an id coming back from the record store.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
