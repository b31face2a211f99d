//! Trust score engine.
//!
//! Four signals, each weighted into a bounded component:
//! 1. **Duration**: visit-history length (fixed placeholder in the reference policy).
//! 2. **Biometric**: face-match confidence, scaled and capped.
//! 3. **Consistency**: whether the visitor is a known regular.
//! 4. **Purpose**: whether the declared purpose is a priority purpose.
//!
//! The components are summed into a 0–100 trust score and the score alone
//! decides admission. The engine is pure: same signals, same policy, same
//! answer.

pub mod breakdown;
pub mod engine;
pub mod error;
pub mod policy;
pub mod signals;

pub use breakdown::{ScoreBreakdown, TrustAssessment};
pub use engine::TrustScoreEngine;
pub use error::ScoringError;
pub use policy::ScorePolicy;
pub use signals::ScoreSignals;
