use thiserror::Error;

use crate::state::WorkflowPhase;

/// How an error should be handled by whoever drives the workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad or missing input. Re-prompt the same step.
    Validation,
    /// A signal provider failed or timed out. Offer a retry.
    Provider,
    /// The record store rejected a finished record. Surface it, keep the outcome.
    Persistence,
    /// The caller broke the workflow contract. Never swallow.
    Programming,
}

/// Failure of one signal-provider call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("visitor lookup failed: {0}")]
    Lookup(String),

    #[error("code dispatch failed: {0}")]
    Dispatch(String),

    #[error("code verification failed: {0}")]
    Verify(String),

    #[error("biometric analysis failed: {0}")]
    Analysis(String),

    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("one-time code not accepted ({attempts_left} attempts left)")]
    CodeRejected { attempts_left: u32 },

    #[error("one-time code expired; request a new one")]
    CodeExpired,

    #[error("no code attempts left; request a new one")]
    AttemptsExhausted,

    #[error("code resend limit ({0}) reached")]
    ResendLimit(u32),

    #[error("cannot {action} in phase {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: WorkflowPhase,
    },

    #[error("another operation is already running on this workflow")]
    Busy,
}

impl WorkflowError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation { .. }
            | Self::CodeRejected { .. }
            | Self::CodeExpired
            | Self::AttemptsExhausted
            | Self::ResendLimit(_) => ErrorClass::Validation,
            Self::Provider(_) => ErrorClass::Provider,
            Self::InvalidTransition { .. } | Self::Busy => ErrorClass::Programming,
        }
    }
}
