//! Verification workflow: connects intake, one-time code, capture and scoring
//! into a single per-visitor state machine.
//!
//! Provider calls are awaited before any state is touched, so a call that
//! fails, times out or is cancelled leaves the workflow where it was.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use svims_scoring::{ScoreSignals, TrustAssessment, TrustScoreEngine};
use svims_types::{AdmissionDecision, Timestamp, VisitorId};
use tracing::{debug, info, warn};

use crate::capture::CaptureSlot;
use crate::clock::{Clock, SystemClock};
use crate::intake::{IntakeEdit, VisitorIntake};
use crate::session::SessionId;
use crate::signals::{ReferenceSignals, SignalProvider};
use crate::state::{RejectionReason, WorkflowPhase};
use crate::{BiometricCapture, ProviderError, VisitorRecord, WorkflowError};

/// Upper bounds on each provider call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkflowTimeouts {
    pub lookup: Duration,
    pub code_dispatch: Duration,
    pub code_verify: Duration,
    pub biometric: Duration,
}

impl Default for WorkflowTimeouts {
    fn default() -> Self {
        Self {
            lookup: Duration::from_secs(5),
            code_dispatch: Duration::from_secs(10),
            code_verify: Duration::from_secs(10),
            biometric: Duration::from_secs(15),
        }
    }
}

/// Limits on one-time code use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodePolicy {
    /// Wrong codes tolerated per issued code.
    pub max_attempts: u32,
    /// Extra codes a visitor may request after the first.
    pub max_resends: u32,
    /// Lifetime of an issued code.
    pub ttl_secs: u64,
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_resends: 2,
            ttl_secs: 300,
        }
    }
}

/// Collaborators shared by every workflow a kiosk starts. Cheap to clone.
#[derive(Clone)]
pub struct WorkflowContext {
    pub signals: Arc<dyn SignalProvider>,
    pub engine: Arc<TrustScoreEngine>,
    pub clock: Arc<dyn Clock>,
    pub timeouts: WorkflowTimeouts,
    pub code_policy: CodePolicy,
}

impl WorkflowContext {
    pub fn new(signals: Arc<dyn SignalProvider>, engine: Arc<TrustScoreEngine>) -> Self {
        Self {
            signals,
            engine,
            clock: Arc::new(SystemClock),
            timeouts: WorkflowTimeouts::default(),
            code_policy: CodePolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeouts(mut self, timeouts: WorkflowTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_code_policy(mut self, code_policy: CodePolicy) -> Self {
        self.code_policy = code_policy;
        self
    }
}

impl Default for WorkflowContext {
    /// Reference providers and the reference scoring policy.
    fn default() -> Self {
        Self::new(
            Arc::new(ReferenceSignals::default()),
            Arc::new(TrustScoreEngine::reference()),
        )
    }
}

/// Events emitted by the workflow for the presentation layer to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowEvent {
    CodeDispatched { resend: bool },
    CodeVerified,
    CaptureStored,
    CaptureDiscarded,
    CaptureAccepted,
    Scored { assessment: TrustAssessment },
    /// Entry refused; someone must acknowledge before the kiosk moves on.
    SecurityAlert { reason: RejectionReason },
    Completed { record_id: VisitorId },
    Acknowledged,
}

/// Result of concluding a scored workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conclusion {
    Admitted(VisitorRecord),
    Refused(RejectionReason),
}

#[derive(Clone, Copy, Debug)]
struct IssuedCode {
    issued_at: Timestamp,
    attempts: u32,
    resends: u32,
}

/// One visitor's registration, from intake to a terminal phase.
pub struct VerificationWorkflow {
    id: SessionId,
    ctx: WorkflowContext,
    phase: WorkflowPhase,
    intake: VisitorIntake,
    capture: CaptureSlot,
    code: Option<IssuedCode>,
    assessment: Option<TrustAssessment>,
    rejection: Option<RejectionReason>,
    pending_events: Vec<WorkflowEvent>,
}

impl VerificationWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        let intake = VisitorIntake::new(ctx.clock.now());
        let id = SessionId::new();
        debug!(session = %id, "workflow started");
        Self {
            id,
            ctx,
            phase: WorkflowPhase::Intake,
            intake,
            capture: CaptureSlot::default(),
            code: None,
            assessment: None,
            rejection: None,
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn intake(&self) -> &VisitorIntake {
        &self.intake
    }

    pub fn pending_capture(&self) -> Option<&BiometricCapture> {
        self.capture.pending()
    }

    pub fn accepted_capture(&self) -> Option<&BiometricCapture> {
        self.capture.accepted()
    }

    pub fn assessment(&self) -> Option<&TrustAssessment> {
        self.assessment.as_ref()
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        self.rejection.as_ref()
    }

    /// Wrong-code attempts left on the current code, if one is issued.
    pub fn code_attempts_left(&self) -> Option<u32> {
        self.code
            .map(|c| self.ctx.code_policy.max_attempts.saturating_sub(c.attempts))
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<WorkflowEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Intake ─────────────────────────────────────────────────────────

    pub fn edit(&mut self, edit: IntakeEdit) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Intake, "edit intake")?;
        self.intake.apply(edit);
        Ok(())
    }

    /// Validate the form, screen the visitor against the blocklist and send a
    /// one-time code. A blocked visitor goes straight to `Rejected` and no
    /// code is sent.
    pub async fn request_code(&mut self) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Intake, "request code")?;
        self.intake.validate_for_code_request()?;

        let key = self.intake.identity_number().lookup_key().to_string();
        let signals = self.ctx.signals.clone();
        let blocked = bounded(
            "blocklist lookup",
            self.ctx.timeouts.lookup,
            signals.is_blocked(&key),
        )
        .await?;

        if blocked {
            warn!(session = %self.id, identity = %self.intake.identity_number(), "blocked visitor at intake");
            self.reject(RejectionReason::Blocklisted);
            return Ok(());
        }

        bounded(
            "code dispatch",
            self.ctx.timeouts.code_dispatch,
            signals.dispatch_code(self.intake.mobile()),
        )
        .await?;

        self.code = Some(IssuedCode {
            issued_at: self.ctx.clock.now(),
            attempts: 0,
            resends: 0,
        });
        self.phase = WorkflowPhase::CodeRequested;
        self.pending_events
            .push(WorkflowEvent::CodeDispatched { resend: false });
        info!(session = %self.id, mobile = %self.intake.masked_mobile(), "one-time code dispatched");
        Ok(())
    }

    // ── One-time code ──────────────────────────────────────────────────

    /// Send a fresh code, resetting the attempt counter and expiry.
    pub async fn resend_code(&mut self) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::CodeRequested, "resend code")?;
        let issued = self.issued_code("resend code")?;
        let max_resends = self.ctx.code_policy.max_resends;
        if issued.resends >= max_resends {
            return Err(WorkflowError::ResendLimit(max_resends));
        }

        let signals = self.ctx.signals.clone();
        bounded(
            "code dispatch",
            self.ctx.timeouts.code_dispatch,
            signals.dispatch_code(self.intake.mobile()),
        )
        .await?;

        self.code = Some(IssuedCode {
            issued_at: self.ctx.clock.now(),
            attempts: 0,
            resends: issued.resends + 1,
        });
        self.pending_events
            .push(WorkflowEvent::CodeDispatched { resend: true });
        info!(session = %self.id, resends = issued.resends + 1, "one-time code re-sent");
        Ok(())
    }

    /// Check the code the visitor typed. A wrong code uses up one attempt; a
    /// provider failure does not.
    pub async fn verify_code(&mut self, code: &str) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::CodeRequested, "verify code")?;
        self.intake.validate_mobile()?;
        if code.trim().is_empty() {
            return Err(WorkflowError::validation("code", "required"));
        }

        let issued = self.issued_code("verify code")?;
        let policy = self.ctx.code_policy;
        if issued.attempts >= policy.max_attempts {
            return Err(WorkflowError::AttemptsExhausted);
        }
        if issued
            .issued_at
            .has_expired(policy.ttl_secs, self.ctx.clock.now())
        {
            return Err(WorkflowError::CodeExpired);
        }

        let signals = self.ctx.signals.clone();
        let accepted = bounded(
            "code verification",
            self.ctx.timeouts.code_verify,
            signals.verify_code(self.intake.mobile(), code.trim()),
        )
        .await?;

        if !accepted {
            let attempts = issued.attempts + 1;
            self.code = Some(IssuedCode { attempts, ..issued });
            let attempts_left = policy.max_attempts.saturating_sub(attempts);
            debug!(session = %self.id, attempts_left, "one-time code rejected");
            return Err(WorkflowError::CodeRejected { attempts_left });
        }

        self.code = None;
        self.phase = WorkflowPhase::CodeVerified;
        self.pending_events.push(WorkflowEvent::CodeVerified);
        info!(session = %self.id, "one-time code verified");
        Ok(())
    }

    // ── Capture ────────────────────────────────────────────────────────

    pub fn begin_capture(&mut self) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::CodeVerified, "begin capture")?;
        self.phase = WorkflowPhase::Capturing;
        Ok(())
    }

    /// Hold a still as pending, replacing any earlier pending one.
    pub fn capture(&mut self, capture: BiometricCapture) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Capturing, "capture")?;
        capture.validate()?;
        self.capture.store(capture);
        self.pending_events.push(WorkflowEvent::CaptureStored);
        Ok(())
    }

    /// Throw the pending still away so another can be taken.
    pub fn retake(&mut self) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Capturing, "retake")?;
        if self.capture.discard() {
            self.pending_events.push(WorkflowEvent::CaptureDiscarded);
        }
        Ok(())
    }

    pub fn accept_capture(&mut self) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Capturing, "accept capture")?;
        self.capture.accept()?;
        self.pending_events.push(WorkflowEvent::CaptureAccepted);
        Ok(())
    }

    // ── Scoring ────────────────────────────────────────────────────────

    /// Collect the remaining signals and compute the trust score. This is the
    /// only place a score is computed; a scored workflow cannot be re-analyzed.
    pub async fn analyze(&mut self) -> Result<TrustAssessment, WorkflowError> {
        self.expect_phase(WorkflowPhase::Capturing, "analyze")?;
        let capture = self
            .capture
            .accepted()
            .ok_or_else(|| WorkflowError::validation("capture", "accept a capture before analysis"))?;

        let key = self.intake.identity_number().lookup_key();
        let signals = self.ctx.signals.clone();
        let returning = bounded(
            "visitor lookup",
            self.ctx.timeouts.lookup,
            signals.lookup_returning_visitor(key),
        )
        .await?;
        let confidence = bounded(
            "biometric analysis",
            self.ctx.timeouts.biometric,
            signals.score_biometric(key, capture),
        )
        .await?;

        let assessment = self.ctx.engine.evaluate(&ScoreSignals::new(
            returning,
            confidence,
            self.intake.purpose(),
        ));

        self.assessment = Some(assessment);
        self.phase = WorkflowPhase::Scored;
        self.pending_events.push(WorkflowEvent::Scored { assessment });
        info!(
            session = %self.id,
            returning,
            confidence,
            score = assessment.total(),
            decision = %assessment.decision,
            "visitor scored"
        );
        Ok(assessment)
    }

    // ── Conclusion ─────────────────────────────────────────────────────

    /// Turn a scored workflow into its terminal phase.
    ///
    /// Allowed and StaffVerify produce the visitor record and end in
    /// `Completed`. Denied ends in `Rejected` and produces no record.
    pub fn conclude(&mut self) -> Result<Conclusion, WorkflowError> {
        self.expect_phase(WorkflowPhase::Scored, "conclude")?;
        let assessment = self.assessment.ok_or(WorkflowError::InvalidTransition {
            action: "conclude",
            phase: self.phase,
        })?;

        if assessment.decision == AdmissionDecision::Denied {
            let reason = RejectionReason::LowTrust(assessment);
            warn!(session = %self.id, score = assessment.total(), "entry denied");
            self.reject(reason);
            return Ok(Conclusion::Refused(reason));
        }

        let photo = self
            .capture
            .take_accepted()
            .ok_or_else(|| WorkflowError::validation("capture", "accepted capture missing"))?;
        let intake = std::mem::take(&mut self.intake);
        let record = VisitorRecord::new(
            VisitorId::new_v4(),
            self.ctx.clock.now(),
            intake,
            &assessment,
            photo,
        );

        self.phase = WorkflowPhase::Completed;
        self.pending_events.push(WorkflowEvent::Completed {
            record_id: record.id().clone(),
        });
        info!(
            session = %self.id,
            record = %record.id(),
            decision = %record.decision(),
            "visitor record finalized"
        );
        Ok(Conclusion::Admitted(record))
    }

    /// Dismiss a security alert. Discards everything about the refused
    /// visitor and reopens the form for the next one.
    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        self.expect_phase(WorkflowPhase::Rejected, "acknowledge")?;
        self.intake = VisitorIntake::new(self.ctx.clock.now());
        self.capture = CaptureSlot::default();
        self.code = None;
        self.assessment = None;
        self.rejection = None;
        self.phase = WorkflowPhase::Intake;
        self.pending_events.push(WorkflowEvent::Acknowledged);
        info!(session = %self.id, "security alert acknowledged");
        Ok(())
    }

    /// Walk away from the registration. Nothing was persisted, so there is
    /// nothing to undo.
    pub fn abandon(self) {
        debug!(session = %self.id, phase = %self.phase, "workflow abandoned");
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn expect_phase(&self, want: WorkflowPhase, action: &'static str) -> Result<(), WorkflowError> {
        if self.phase == want {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn issued_code(&self, action: &'static str) -> Result<IssuedCode, WorkflowError> {
        self.code.ok_or(WorkflowError::InvalidTransition {
            action,
            phase: self.phase,
        })
    }

    fn reject(&mut self, reason: RejectionReason) {
        self.capture = CaptureSlot::default();
        self.code = None;
        self.rejection = Some(reason);
        self.phase = WorkflowPhase::Rejected;
        self.pending_events
            .push(WorkflowEvent::SecurityAlert { reason });
    }
}

/// Await a provider call, failing with [`ProviderError::Timeout`] once
/// `limit` has passed.
async fn bounded<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            operation,
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
