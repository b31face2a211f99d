//! The finalized, immutable outcome of one visitor's registration.

use serde::Serialize;
use svims_scoring::TrustAssessment;
use svims_types::{AdmissionDecision, IdentityNumber, Timestamp, VisitPurpose, VisitorId};

use crate::{BiometricCapture, VisitorIntake};

/// Intake details, trust score, decision and photo of one admitted visitor.
///
/// Has no setters: once built it is handed to record sinks as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisitorRecord {
    id: VisitorId,
    created_at: Timestamp,
    intake: VisitorIntake,
    score: u8,
    decision: AdmissionDecision,
    photo: BiometricCapture,
}

impl VisitorRecord {
    pub fn new(
        id: VisitorId,
        created_at: Timestamp,
        intake: VisitorIntake,
        assessment: &TrustAssessment,
        photo: BiometricCapture,
    ) -> Self {
        Self {
            id,
            created_at,
            intake,
            score: assessment.total(),
            decision: assessment.decision,
            photo,
        }
    }

    pub fn id(&self) -> &VisitorId {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn full_name(&self) -> &str {
        self.intake.full_name()
    }

    pub fn identity_number(&self) -> &IdentityNumber {
        self.intake.identity_number()
    }

    pub fn mobile(&self) -> &str {
        self.intake.mobile()
    }

    pub fn address(&self) -> Option<&str> {
        self.intake.address()
    }

    pub fn host(&self) -> Option<&str> {
        self.intake.host()
    }

    pub fn purpose(&self) -> VisitPurpose {
        self.intake.purpose()
    }

    pub fn arrived_at(&self) -> Timestamp {
        self.intake.arrived_at()
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn decision(&self) -> AdmissionDecision {
        self.decision
    }

    pub fn photo(&self) -> &BiometricCapture {
        &self.photo
    }
}
