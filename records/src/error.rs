use svims_types::TypesError;
use svims_verification::ErrorClass;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("HTTP request to record store failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from record store: {0}")]
    InvalidResponse(String),

    #[error("record store unreachable: {0}")]
    Unreachable(String),

    #[error("record could not be encoded: {0}")]
    Encoding(#[from] TypesError),

    #[error("{0}")]
    Other(String),
}

impl RecordError {
    /// Every record failure is a persistence failure: the visitor's outcome
    /// stands, the operator is told.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Persistence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_failures_are_persistence_class() {
        for err in [
            RecordError::RequestFailed("HTTP status 500".into()),
            RecordError::Unreachable("connection failed".into()),
            RecordError::Encoding(TypesError::TimestampOutOfRange(u64::MAX)),
        ] {
            assert_eq!(err.class(), ErrorClass::Persistence);
        }
    }
}
