//! Scoring weights and admission thresholds.
//!
//! Every value is configurable; [`ScorePolicy::default`] is the reference
//! policy the kiosk ships with.

use serde::{Deserialize, Serialize};
use svims_types::VisitPurpose;

use crate::ScoringError;

/// Highest possible trust score.
pub const MAX_TOTAL: u8 = 100;

/// Number of weighted components summed into the total.
pub const COMPONENT_COUNT: u8 = 4;

/// Scores strictly above this are admitted without staff involvement.
pub const DEFAULT_ALLOW_THRESHOLD: u8 = 80;

/// Scores at or below this are denied.
pub const DEFAULT_DENY_THRESHOLD: u8 = 50;

/// Basis-point denominator for the biometric weight.
pub const BPS_DENOMINATOR: u32 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorePolicy {
    /// Upper bound of every individual component.
    pub component_cap: u8,

    /// Duration component. A placeholder until a visit-history lookup exists.
    pub duration_points: u8,

    /// Biometric weight in basis points (2500 = confidence × 0.25),
    /// rounded half up and capped at `component_cap`.
    pub biometric_weight_bps: u32,

    /// Consistency component for a known regular visitor.
    pub returning_points: u8,

    /// Consistency component for a first-time visitor.
    pub new_visitor_points: u8,

    /// Purposes that earn `priority_purpose_points`.
    pub priority_purposes: Vec<VisitPurpose>,
    pub priority_purpose_points: u8,
    pub standard_purpose_points: u8,

    /// `total > allow_threshold` → Allowed.
    pub allow_threshold: u8,

    /// `total <= deny_threshold` → Denied; anything between is StaffVerify.
    pub deny_threshold: u8,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            component_cap: 25,
            duration_points: 25,
            biometric_weight_bps: 2_500,
            returning_points: 25,
            new_visitor_points: 10,
            priority_purposes: vec![VisitPurpose::Meeting, VisitPurpose::Interview],
            priority_purpose_points: 25,
            standard_purpose_points: 15,
            allow_threshold: DEFAULT_ALLOW_THRESHOLD,
            deny_threshold: DEFAULT_DENY_THRESHOLD,
        }
    }
}

impl ScorePolicy {
    /// Check that the policy keeps every total inside `0..=100` and that the
    /// thresholds carve out three non-empty bands.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let max_cap = MAX_TOTAL / COMPONENT_COUNT;
        if self.component_cap > max_cap {
            return Err(ScoringError::CapTooLarge {
                cap: self.component_cap,
                max: MAX_TOTAL,
            });
        }

        let fixed = [
            ("duration", self.duration_points),
            ("returning", self.returning_points),
            ("new visitor", self.new_visitor_points),
            ("priority purpose", self.priority_purpose_points),
            ("standard purpose", self.standard_purpose_points),
        ];
        for (component, points) in fixed {
            if points > self.component_cap {
                return Err(ScoringError::ComponentAboveCap {
                    component,
                    points,
                    cap: self.component_cap,
                });
            }
        }

        if self.allow_threshold > MAX_TOTAL {
            return Err(ScoringError::AllowThresholdTooHigh(self.allow_threshold));
        }
        if self.deny_threshold >= self.allow_threshold {
            return Err(ScoringError::ThresholdsInverted {
                deny: self.deny_threshold,
                allow: self.allow_threshold,
            });
        }
        Ok(())
    }

    pub fn is_priority(&self, purpose: VisitPurpose) -> bool {
        self.priority_purposes.contains(&purpose)
    }
}
