//! JSON shape of a visitor record on the wire.
//!
//! `POST` bodies and `GET` history rows share this shape. Field names follow
//! the record store's column headings, so the identity number travels as
//! `aadhaar`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use svims_types::{AdmissionDecision, FixedOffset};
use svims_verification::{CaptureData, VisitorRecord};

use crate::RecordError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub id: String,
    /// ISO date the record was created, `YYYY-MM-DD`.
    pub date: String,
    pub name: String,
    pub aadhaar: String,
    pub mobile: String,
    /// Arrival time, `HH:MM`.
    pub time: String,
    pub score: u8,
    /// "Allowed", "Staff Verify" or "Denied".
    pub status: String,
    pub purpose: String,
    /// Embedded image as a `data:` URI, or a plain image reference.
    #[serde(default)]
    pub photo: String,
}

impl RecordPayload {
    /// Wire row with date and time rendered in UTC.
    pub fn from_record(record: &VisitorRecord) -> Result<Self, RecordError> {
        Self::from_record_at(record, svims_types::utc())
    }

    /// Wire row with date and time rendered at the kiosk's `offset`.
    pub fn from_record_at(record: &VisitorRecord, offset: FixedOffset) -> Result<Self, RecordError> {
        Ok(Self {
            id: record.id().as_str().to_string(),
            date: record.created_at().date_string_at(offset)?,
            name: record.full_name().to_string(),
            aadhaar: record.identity_number().as_str().to_string(),
            mobile: record.mobile().to_string(),
            time: record.arrived_at().time_string_at(offset)?,
            score: record.score(),
            status: record.decision().label().to_string(),
            purpose: record.purpose().label().to_string(),
            photo: photo_uri(record.photo().data()),
        })
    }

    /// Parsed status; `None` for labels this kiosk does not know.
    pub fn decision(&self) -> Option<AdmissionDecision> {
        self.status.parse().ok()
    }
}

fn photo_uri(data: &CaptureData) -> String {
    match data {
        CaptureData::Image { mime, bytes } => {
            format!("data:{mime};base64,{}", STANDARD.encode(bytes))
        }
        CaptureData::Uri(uri) => uri.clone(),
    }
}
