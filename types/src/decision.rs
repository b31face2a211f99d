//! The three-way gate outcome derived from a trust score.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Whether a visitor may walk in, must be checked by staff, or is turned away.
///
/// Serialized with the labels the operator dashboard shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdmissionDecision {
    #[serde(rename = "Allowed")]
    Allowed,
    #[serde(rename = "Staff Verify")]
    StaffVerify,
    #[serde(rename = "Denied")]
    Denied,
}

impl AdmissionDecision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Allowed => "Allowed",
            Self::StaffVerify => "Staff Verify",
            Self::Denied => "Denied",
        }
    }

    /// Whether the visitor can be completed into a record without a security
    /// acknowledgment.
    pub fn admits(&self) -> bool {
        matches!(self, Self::Allowed | Self::StaffVerify)
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdmissionDecision {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Allowed" => Ok(Self::Allowed),
            "Staff Verify" | "StaffVerify" => Ok(Self::StaffVerify),
            "Denied" => Ok(Self::Denied),
            other => Err(TypesError::UnknownDecision(other.to_string())),
        }
    }
}
