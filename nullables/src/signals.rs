//! Nullable signal provider: scripted answers, injectable faults.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use svims_verification::{BiometricCapture, ProviderError, SignalProvider};

/// One kind of provider call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalCall {
    Lookup,
    Blocklist,
    Dispatch,
    Verify,
    Biometric,
}

/// How a scripted call misbehaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Return a provider error straight away.
    Fail,
    /// Never answer. Useful for exercising timeouts.
    Hang,
}

/// A signal provider whose every answer is set up by the test.
///
/// By default nobody is a returning visitor, nobody is blocked, any
/// non-empty code is accepted and the biometric confidence is 0.
#[derive(Debug, Default)]
pub struct NullSignalProvider {
    returning: HashSet<String>,
    blocked: HashSet<String>,
    accepted_code: Option<String>,
    confidence: AtomicI32,
    faults: Mutex<HashMap<SignalCall, Fault>>,
    calls: Mutex<HashMap<SignalCall, u32>>,
    dispatched: Mutex<Vec<String>>,
}

impl NullSignalProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_returning(mut self, identity_key: impl Into<String>) -> Self {
        self.returning.insert(identity_key.into());
        self
    }

    pub fn with_blocked(mut self, identity_key: impl Into<String>) -> Self {
        self.blocked.insert(identity_key.into());
        self
    }

    /// Only this code verifies; anything else is a wrong code.
    pub fn accepting_code(mut self, code: impl Into<String>) -> Self {
        self.accepted_code = Some(code.into());
        self
    }

    pub fn with_confidence(self, confidence: i32) -> Self {
        self.set_confidence(confidence);
        self
    }

    pub fn set_confidence(&self, confidence: i32) {
        self.confidence.store(confidence, Ordering::SeqCst);
    }

    /// Make every later `call` misbehave until [`heal`](Self::heal).
    pub fn inject(&self, call: SignalCall, fault: Fault) {
        locked(&self.faults).insert(call, fault);
    }

    pub fn heal(&self, call: SignalCall) {
        locked(&self.faults).remove(&call);
    }

    /// How many times `call` was made, faulty or not.
    pub fn calls(&self, call: SignalCall) -> u32 {
        locked(&self.calls).get(&call).copied().unwrap_or(0)
    }

    /// Mobiles a code was successfully sent to, in order.
    pub fn dispatched_to(&self) -> Vec<String> {
        locked(&self.dispatched).clone()
    }

    async fn enter(&self, call: SignalCall) -> Result<(), ProviderError> {
        *locked(&self.calls).entry(call).or_insert(0) += 1;
        let fault = locked(&self.faults).get(&call).copied();
        match fault {
            None => Ok(()),
            Some(Fault::Fail) => Err(injected(call)),
            Some(Fault::Hang) => std::future::pending().await,
        }
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(call: SignalCall) -> ProviderError {
    let message = "injected failure".to_string();
    match call {
        SignalCall::Lookup | SignalCall::Blocklist => ProviderError::Lookup(message),
        SignalCall::Dispatch => ProviderError::Dispatch(message),
        SignalCall::Verify => ProviderError::Verify(message),
        SignalCall::Biometric => ProviderError::Analysis(message),
    }
}

#[async_trait]
impl SignalProvider for NullSignalProvider {
    fn name(&self) -> &str {
        "null"
    }

    async fn lookup_returning_visitor(&self, identity_key: &str) -> Result<bool, ProviderError> {
        self.enter(SignalCall::Lookup).await?;
        Ok(self.returning.contains(identity_key))
    }

    async fn is_blocked(&self, identity_key: &str) -> Result<bool, ProviderError> {
        self.enter(SignalCall::Blocklist).await?;
        Ok(self.blocked.contains(identity_key))
    }

    async fn dispatch_code(&self, mobile: &str) -> Result<(), ProviderError> {
        self.enter(SignalCall::Dispatch).await?;
        locked(&self.dispatched).push(mobile.to_string());
        Ok(())
    }

    async fn verify_code(&self, _mobile: &str, code: &str) -> Result<bool, ProviderError> {
        self.enter(SignalCall::Verify).await?;
        Ok(match &self.accepted_code {
            Some(expected) => expected == code,
            None => !code.trim().is_empty(),
        })
    }

    async fn score_biometric(
        &self,
        _identity_key: &str,
        _capture: &BiometricCapture,
    ) -> Result<i32, ProviderError> {
        self.enter(SignalCall::Biometric).await?;
        Ok(self.confidence.load(Ordering::SeqCst))
    }
}
