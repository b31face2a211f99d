//! Workflow phase tracking.

use serde::Serialize;
use std::fmt;
use svims_scoring::TrustAssessment;

/// Where a visitor's registration currently stands.
///
/// `Intake → CodeRequested → CodeVerified → Capturing → Scored → {Completed | Rejected}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WorkflowPhase {
    /// Visitor details are being filled in.
    Intake,
    /// A one-time code was sent to the visitor's mobile.
    CodeRequested,
    /// The code was accepted.
    CodeVerified,
    /// Camera is live; stills may be taken, retaken and accepted.
    Capturing,
    /// Trust score computed; waiting to be concluded.
    Scored,
    /// Record emitted. Terminal.
    Completed,
    /// Entry refused; waiting for a security acknowledgment. Terminal.
    Rejected,
}

impl WorkflowPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Why a visitor ended in [`WorkflowPhase::Rejected`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RejectionReason {
    /// The trust score fell in the Denied band.
    LowTrust(TrustAssessment),
    /// The identity key is on the blocked-visitor list.
    Blocklisted,
}
