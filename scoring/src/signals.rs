//! Raw inputs to the engine, as collected by the signal providers.

use serde::{Deserialize, Serialize};
use svims_types::VisitPurpose;

/// Highest biometric confidence a provider may report.
pub const MAX_CONFIDENCE: i32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSignals {
    /// The visitor's lookup key is in the regular-visitor directory.
    pub returning_visitor: bool,
    /// Face-match confidence as reported by the biometric provider.
    /// Values outside `0..=100` are clamped before weighting.
    pub biometric_confidence: i32,
    pub purpose: VisitPurpose,
}

impl ScoreSignals {
    pub fn new(returning_visitor: bool, biometric_confidence: i32, purpose: VisitPurpose) -> Self {
        Self {
            returning_visitor,
            biometric_confidence,
            purpose,
        }
    }

    pub fn clamped_confidence(&self) -> u32 {
        self.biometric_confidence.clamp(0, MAX_CONFIDENCE) as u32
    }
}
