//! Per-component score and the decision derived from it.

use serde::Serialize;
use svims_types::AdmissionDecision;

/// The four weighted components and their sum.
///
/// Built only by the engine, so `total` always equals the sum of the parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    duration: u8,
    biometric: u8,
    consistency: u8,
    purpose: u8,
    total: u8,
}

impl ScoreBreakdown {
    pub(crate) fn new(duration: u8, biometric: u8, consistency: u8, purpose: u8) -> Self {
        Self {
            duration,
            biometric,
            consistency,
            purpose,
            total: duration + biometric + consistency + purpose,
        }
    }

    pub fn duration(&self) -> u8 {
        self.duration
    }

    pub fn biometric(&self) -> u8 {
        self.biometric
    }

    pub fn consistency(&self) -> u8 {
        self.consistency
    }

    pub fn purpose(&self) -> u8 {
        self.purpose
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    /// Components in display order: duration, biometric, consistency, purpose.
    pub fn components(&self) -> [u8; 4] {
        [self.duration, self.biometric, self.consistency, self.purpose]
    }
}

/// Outcome of one engine evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrustAssessment {
    pub breakdown: ScoreBreakdown,
    pub decision: AdmissionDecision,
}

impl TrustAssessment {
    pub fn total(&self) -> u8 {
        self.breakdown.total()
    }
}
