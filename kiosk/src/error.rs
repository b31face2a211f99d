use svims_verification::{ErrorClass, SessionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("workflow error: {0}")]
    Workflow(#[from] svims_verification::WorkflowError),

    #[error("scoring policy error: {0}")]
    Scoring(#[from] svims_scoring::ScoringError),

    #[error("record store error: {0}")]
    Record(#[from] svims_records::RecordError),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    #[error("record persistence task failed: {0}")]
    Persistence(String),

    #[error("no remote record store configured")]
    NoRemoteStore,

    #[error("logging already initialised: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KioskError {
    /// How the presentation layer should treat this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Workflow(e) => e.class(),
            Self::Record(e) => e.class(),
            Self::Persistence(_) | Self::NoRemoteStore => ErrorClass::Persistence,
            Self::Scoring(_)
            | Self::Config(_)
            | Self::UnknownSession(_)
            | Self::Logging(_)
            | Self::Io(_) => ErrorClass::Programming,
        }
    }
}
