//! Pluggable signal providers.
//!
//! The workflow does not care HOW a visitor is looked up, how a code reaches
//! their phone, or how a face is matched. It only needs the four raw signals.
//! Providers might include:
//! - an SMS gateway for one-time codes
//! - a face-matching service scoring the capture against a stored photo
//! - a visit-history database for returning visitors
//!
//! [`ReferenceSignals`] is the in-repo stand-in: a static directory, fixed
//! pacing delays, any non-empty code accepted, and a constant biometric score.
//! None of its answers carry real identity assurance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::{BiometricCapture, ProviderError};

/// Biometric confidence the reference provider reports for a regular visitor.
pub const REGULAR_CONFIDENCE: i32 = 85;

/// Biometric confidence the reference provider reports for anyone else.
pub const NEW_VISITOR_CONFIDENCE: i32 = 55;

/// Source of the raw scoring inputs. Every call is asynchronous and may fail
/// on its own; the workflow bounds each one with a timeout.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Whether the visitor with this identity key has visited before.
    async fn lookup_returning_visitor(&self, identity_key: &str) -> Result<bool, ProviderError>;

    /// Whether this identity key is barred from entry. Providers without a
    /// blocklist admit everyone to scoring.
    async fn is_blocked(&self, identity_key: &str) -> Result<bool, ProviderError> {
        let _ = identity_key;
        Ok(false)
    }

    /// Send a one-time code to the visitor's mobile.
    async fn dispatch_code(&self, mobile: &str) -> Result<(), ProviderError>;

    /// Check a code typed in by the visitor against the one issued to `mobile`.
    async fn verify_code(&self, mobile: &str, code: &str) -> Result<bool, ProviderError>;

    /// Face-match confidence for the accepted capture, nominally `0..=100`.
    async fn score_biometric(
        &self,
        identity_key: &str,
        capture: &BiometricCapture,
    ) -> Result<i32, ProviderError>;
}

/// Known regulars and blocked visitors, keyed by identity lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorDirectory {
    pub regular_visitors: HashSet<String>,
    pub blocked_visitors: HashSet<String>,
}

impl VisitorDirectory {
    pub fn new(
        regular: impl IntoIterator<Item = impl Into<String>>,
        blocked: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            regular_visitors: regular.into_iter().map(Into::into).collect(),
            blocked_visitors: blocked.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_regular(&self, identity_key: &str) -> bool {
        self.regular_visitors.contains(identity_key)
    }

    pub fn is_blocked(&self, identity_key: &str) -> bool {
        self.blocked_visitors.contains(identity_key)
    }
}

impl Default for VisitorDirectory {
    fn default() -> Self {
        Self::new(["9876", "1234"], ["0000"])
    }
}

/// Artificial latency of the reference provider, for kiosk UX pacing only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceDelays {
    pub dispatch: Duration,
    pub verify: Duration,
    pub analysis: Duration,
}

impl ReferenceDelays {
    pub fn none() -> Self {
        Self {
            dispatch: Duration::ZERO,
            verify: Duration::ZERO,
            analysis: Duration::ZERO,
        }
    }
}

impl Default for ReferenceDelays {
    fn default() -> Self {
        Self {
            dispatch: Duration::from_millis(800),
            verify: Duration::from_millis(800),
            analysis: Duration::from_millis(1500),
        }
    }
}

/// Deterministic stand-in for real SMS and face-matching providers.
#[derive(Clone, Debug, Default)]
pub struct ReferenceSignals {
    directory: VisitorDirectory,
    delays: ReferenceDelays,
}

impl ReferenceSignals {
    pub fn new(directory: VisitorDirectory, delays: ReferenceDelays) -> Self {
        Self { directory, delays }
    }

    pub fn directory(&self) -> &VisitorDirectory {
        &self.directory
    }
}

async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl SignalProvider for ReferenceSignals {
    fn name(&self) -> &str {
        "reference"
    }

    async fn lookup_returning_visitor(&self, identity_key: &str) -> Result<bool, ProviderError> {
        Ok(self.directory.is_regular(identity_key))
    }

    async fn is_blocked(&self, identity_key: &str) -> Result<bool, ProviderError> {
        Ok(self.directory.is_blocked(identity_key))
    }

    async fn dispatch_code(&self, _mobile: &str) -> Result<(), ProviderError> {
        pace(self.delays.dispatch).await;
        debug!(provider = "reference", "one-time code dispatch simulated");
        Ok(())
    }

    async fn verify_code(&self, _mobile: &str, code: &str) -> Result<bool, ProviderError> {
        pace(self.delays.verify).await;
        Ok(!code.trim().is_empty())
    }

    async fn score_biometric(
        &self,
        identity_key: &str,
        _capture: &BiometricCapture,
    ) -> Result<i32, ProviderError> {
        pace(self.delays.analysis).await;
        Ok(if self.directory.is_regular(identity_key) {
            REGULAR_CONFIDENCE
        } else {
            NEW_VISITOR_CONFIDENCE
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svims_types::Timestamp;

    fn provider() -> ReferenceSignals {
        ReferenceSignals::new(VisitorDirectory::default(), ReferenceDelays::none())
    }

    #[tokio::test]
    async fn regulars_are_recognised() {
        let p = provider();
        assert!(p.lookup_returning_visitor("9876").await.unwrap());
        assert!(p.lookup_returning_visitor("1234").await.unwrap());
        assert!(!p.lookup_returning_visitor("3456").await.unwrap());
    }

    #[tokio::test]
    async fn blocklist_is_consulted() {
        let p = provider();
        assert!(p.is_blocked("0000").await.unwrap());
        assert!(!p.is_blocked("9876").await.unwrap());
    }

    #[tokio::test]
    async fn any_non_empty_code_is_accepted() {
        let p = provider();
        assert!(p.verify_code("9876543210", "000000").await.unwrap());
        assert!(p.verify_code("9876543210", "x").await.unwrap());
        assert!(!p.verify_code("9876543210", "  ").await.unwrap());
    }

    #[tokio::test]
    async fn biometric_score_is_fixed_per_directory_membership() {
        let p = provider();
        let frame = BiometricCapture::image("image/jpeg", vec![1, 2, 3], Timestamp::EPOCH);
        assert_eq!(p.score_biometric("9876", &frame).await.unwrap(), REGULAR_CONFIDENCE);
        assert_eq!(p.score_biometric("3456", &frame).await.unwrap(), NEW_VISITOR_CONFIDENCE);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_is_paced() {
        let p = ReferenceSignals::default();
        let started = tokio::time::Instant::now();
        p.dispatch_code("9876543210").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test]
    async fn default_trait_blocklist_admits_everyone() {
        struct Minimal;

        #[async_trait]
        impl SignalProvider for Minimal {
            fn name(&self) -> &str {
                "minimal"
            }
            async fn lookup_returning_visitor(&self, _: &str) -> Result<bool, ProviderError> {
                Ok(false)
            }
            async fn dispatch_code(&self, _: &str) -> Result<(), ProviderError> {
                Ok(())
            }
            async fn verify_code(&self, _: &str, _: &str) -> Result<bool, ProviderError> {
                Ok(true)
            }
            async fn score_biometric(&self, _: &str, _: &BiometricCapture) -> Result<i32, ProviderError> {
                Ok(0)
            }
        }

        assert!(!Minimal.is_blocked("0000").await.unwrap());
    }
}
