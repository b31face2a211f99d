//! Error type for parsing and validating shared value types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("unknown visit purpose: {0:?}")]
    UnknownPurpose(String),

    #[error("unknown admission status: {0:?}")]
    UnknownDecision(String),

    #[error("timestamp {0} is outside the representable calendar range")]
    TimestampOutOfRange(u64),

    #[error("UTC offset of {0} minutes is out of range")]
    OffsetOutOfRange(i32),
}
