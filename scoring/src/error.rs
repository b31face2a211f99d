use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("component cap {cap} allows a total above {max}")]
    CapTooLarge { cap: u8, max: u8 },

    #[error("{component} points {points} exceed the component cap {cap}")]
    ComponentAboveCap {
        component: &'static str,
        points: u8,
        cap: u8,
    },

    #[error("deny threshold {deny} must be below allow threshold {allow}")]
    ThresholdsInverted { deny: u8, allow: u8 },

    #[error("allow threshold {0} is above the maximum score")]
    AllowThresholdTooHigh(u8),
}
