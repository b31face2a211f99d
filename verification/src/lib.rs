//! Visitor verification workflow.
//!
//! One registration walks through five steps:
//! 1. **Intake**: the visitor fills in name, identity number, mobile and purpose.
//! 2. **One-time code**: a code is sent to the mobile and typed back in.
//! 3. **Capture**: a photo is taken, optionally retaken, then accepted.
//! 4. **Scoring**: external signals are gathered and fed to the trust score engine.
//! 5. **Conclusion**: admitted visitors get a record; refused ones raise a
//!    security alert that must be acknowledged.
//!
//! Where the signals come from is pluggable through [`SignalProvider`].

pub mod capture;
pub mod clock;
pub mod error;
pub mod intake;
pub mod record;
pub mod session;
pub mod signals;
pub mod state;
pub mod workflow;

pub use capture::{BiometricCapture, CaptureData, CaptureSlot};
pub use clock::{Clock, SystemClock};
pub use error::{ErrorClass, ProviderError, WorkflowError};
pub use intake::{IntakeEdit, VisitorIntake};
pub use record::VisitorRecord;
pub use session::{SessionId, SharedWorkflow};
pub use signals::{ReferenceDelays, ReferenceSignals, SignalProvider, VisitorDirectory};
pub use state::{RejectionReason, WorkflowPhase};
pub use workflow::{
    CodePolicy, Conclusion, VerificationWorkflow, WorkflowContext, WorkflowEvent,
    WorkflowTimeouts,
};
