//! Timestamp type used throughout the kiosk.
//!
//! Timestamps are Unix epoch seconds (UTC). Calendar rendering for the record
//! wire shape goes through `chrono` and happens at a fixed UTC offset, the
//! kiosk's local time.

use chrono::{DateTime, Offset, Utc};
pub use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::TypesError;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    ///
    /// A clock set before 1970 reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }

    /// Convert to a calendar date-time in UTC.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, TypesError> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(TypesError::TimestampOutOfRange(self.0))
    }

    /// Convert to a calendar date-time at the given UTC offset.
    pub fn to_datetime_at(&self, offset: FixedOffset) -> Result<DateTime<FixedOffset>, TypesError> {
        Ok(self.to_datetime()?.with_timezone(&offset))
    }

    /// ISO calendar date in UTC, e.g. `2026-10-17`.
    pub fn date_string(&self) -> Result<String, TypesError> {
        self.date_string_at(utc())
    }

    /// Wall-clock time in UTC, e.g. `09:15`.
    pub fn time_string(&self) -> Result<String, TypesError> {
        self.time_string_at(utc())
    }

    /// ISO calendar date as seen at `offset`.
    pub fn date_string_at(&self, offset: FixedOffset) -> Result<String, TypesError> {
        Ok(self.to_datetime_at(offset)?.format("%Y-%m-%d").to_string())
    }

    /// Wall-clock time as shown on the visitor list, e.g. `14:45`.
    pub fn time_string_at(&self, offset: FixedOffset) -> Result<String, TypesError> {
        Ok(self.to_datetime_at(offset)?.format("%H:%M").to_string())
    }
}

/// The zero offset.
pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Longest offset any real time zone uses, in minutes.
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// A fixed offset east of UTC, e.g. `330` for India (UTC+05:30).
pub fn utc_offset(minutes: i32) -> Result<FixedOffset, TypesError> {
    if minutes.abs() > MAX_OFFSET_MINUTES {
        return Err(TypesError::OffsetOutOfRange(minutes));
    }
    FixedOffset::east_opt(minutes * 60).ok_or(TypesError::OffsetOutOfRange(minutes))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
