//! The scoring function itself.

use svims_types::AdmissionDecision;

use crate::policy::BPS_DENOMINATOR;
use crate::{ScoreBreakdown, ScorePolicy, ScoreSignals, ScoringError, TrustAssessment};

/// Maps visitor signals to a trust score and an admission decision.
///
/// Construction validates the policy, after which [`evaluate`](Self::evaluate)
/// is a total function: it cannot fail and has no side effects.
#[derive(Clone, Debug)]
pub struct TrustScoreEngine {
    policy: ScorePolicy,
}

impl TrustScoreEngine {
    pub fn new(policy: ScorePolicy) -> Result<Self, ScoringError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Engine running the reference policy (thresholds 80 / 50).
    pub fn reference() -> Self {
        Self {
            policy: ScorePolicy::default(),
        }
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    pub fn evaluate(&self, signals: &ScoreSignals) -> TrustAssessment {
        let p = &self.policy;

        let duration = p.duration_points;
        let biometric = self.biometric_component(signals.clamped_confidence());
        let consistency = if signals.returning_visitor {
            p.returning_points
        } else {
            p.new_visitor_points
        };
        let purpose = if p.is_priority(signals.purpose) {
            p.priority_purpose_points
        } else {
            p.standard_purpose_points
        };

        let breakdown = ScoreBreakdown::new(duration, biometric, consistency, purpose);
        TrustAssessment {
            breakdown,
            decision: self.decide(breakdown.total()),
        }
    }

    /// Threshold a total: `> allow` admits, `<= deny` refuses, the band in
    /// between goes to staff.
    pub fn decide(&self, total: u8) -> AdmissionDecision {
        if total > self.policy.allow_threshold {
            AdmissionDecision::Allowed
        } else if total > self.policy.deny_threshold {
            AdmissionDecision::StaffVerify
        } else {
            AdmissionDecision::Denied
        }
    }

    // confidence × weight, rounded half up, capped
    fn biometric_component(&self, confidence: u32) -> u8 {
        let weighted = (u64::from(confidence) * u64::from(self.policy.biometric_weight_bps)
            + u64::from(BPS_DENOMINATOR / 2))
            / u64::from(BPS_DENOMINATOR);
        weighted.min(u64::from(self.policy.component_cap)) as u8
    }
}

impl Default for TrustScoreEngine {
    fn default() -> Self {
        Self::reference()
    }
}
