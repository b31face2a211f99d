//! Integration tests exercising the full registration pipeline:
//! intake → one-time code → capture → scoring → finalize → record sinks.
//!
//! These wire the kiosk to nullables, so every provider answer, fault and
//! clock tick is under the test's control.

use std::sync::Arc;
use std::time::Duration;

use svims_kiosk::{Finalized, Kiosk, KioskConfig, KioskError, OperatorAlert};
use svims_nullables::{Fault, NullClock, NullRecordSink, NullSignalProvider, SignalCall};
use svims_records::{RecordError, RecordPayload, RecordSink, RemoteOutcome};
use svims_types::{AdmissionDecision, Timestamp, VisitPurpose};
use svims_verification::{
    BiometricCapture, ErrorClass, IntakeEdit, ProviderError, RejectionReason, SharedWorkflow,
    WorkflowError, WorkflowPhase,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START: u64 = 1_709_630_142;

fn quiet_config() -> KioskConfig {
    let mut config = KioskConfig::default();
    config.mock.dispatch_ms = 0;
    config.mock.verify_ms = 0;
    config.mock.analysis_ms = 0;
    config
}

fn provider() -> NullSignalProvider {
    NullSignalProvider::new()
        .with_returning("9876")
        .with_blocked("0000")
        .accepting_code("482913")
        .with_confidence(85)
}

struct Rig {
    kiosk: Kiosk,
    signals: Arc<NullSignalProvider>,
    clock: Arc<NullClock>,
    store: Arc<NullRecordSink>,
}

fn rig_with(signals: NullSignalProvider, store: NullRecordSink) -> Rig {
    let signals = Arc::new(signals);
    let clock = Arc::new(NullClock::new(START));
    let store = Arc::new(store);
    let kiosk = Kiosk::with_parts(
        quiet_config(),
        signals.clone(),
        clock.clone(),
        Some(store.clone() as Arc<dyn RecordSink>),
    )
    .expect("valid config");
    Rig {
        kiosk,
        signals,
        clock,
        store,
    }
}

fn rig() -> Rig {
    rig_with(provider(), NullRecordSink::new())
}

fn frame() -> BiometricCapture {
    BiometricCapture::image("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0], Timestamp::new(START))
}

async fn fill_intake(session: &SharedWorkflow, identity: &str, purpose: VisitPurpose) {
    let mut wf = session.try_lock().unwrap();
    wf.edit(IntakeEdit::FullName("Rahul Verma".into())).unwrap();
    wf.edit(IntakeEdit::IdentityNumber(identity.into())).unwrap();
    wf.edit(IntakeEdit::Mobile("+91 98765 43210".into())).unwrap();
    wf.edit(IntakeEdit::Host("Meera Iyer".into())).unwrap();
    wf.edit(IntakeEdit::Purpose(purpose)).unwrap();
}

async fn drive_to_capture(session: &SharedWorkflow) {
    let mut wf = session.try_lock().unwrap();
    wf.request_code().await.unwrap();
    wf.verify_code("482913").await.unwrap();
    wf.begin_capture().unwrap();
    wf.capture(frame()).unwrap();
    wf.accept_capture().unwrap();
}

async fn scored_session(rig: &Rig, identity: &str, purpose: VisitPurpose) -> SharedWorkflow {
    let session = rig.kiosk.start_session().await;
    fill_intake(&session, identity, purpose).await;
    drive_to_capture(&session).await;
    session.try_lock().unwrap().analyze().await.unwrap();
    session
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regular_visitor_is_admitted_and_persisted() {
    let rig = rig();
    let session = scored_session(&rig, "123456789876", VisitPurpose::Meeting).await;

    let Finalized::Admitted { record, persistence } =
        rig.kiosk.finalize(session.id()).await.unwrap()
    else {
        panic!("regular visitor should be admitted");
    };
    assert_eq!(record.score(), 96);
    assert_eq!(record.decision(), AdmissionDecision::Allowed);
    assert_eq!(record.host(), Some("Meera Iyer"));

    let report = persistence.settled().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.remote, RemoteOutcome::Stored);
    assert_eq!(rig.store.submitted(), vec![record.clone()]);

    let recent = rig.kiosk.recent(5).await;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, record.id().as_str());
    assert_eq!(recent[0].status, "Allowed");
    assert_eq!(rig.kiosk.summary().await.allowed, 1);

    // the finished session is gone
    assert!(rig.kiosk.session(session.id()).await.is_none());
    assert!(session.try_lock().unwrap().phase().is_terminal());
}

#[tokio::test]
async fn new_visitor_on_delivery_needs_staff() {
    let rig = rig_with(provider().with_confidence(55), NullRecordSink::new());
    let session = scored_session(&rig, "4444", VisitPurpose::Delivery).await;
    assert_eq!(session.try_lock().unwrap().assessment().unwrap().total(), 64);

    let Finalized::Admitted { record, persistence } =
        rig.kiosk.finalize(session.id()).await.unwrap()
    else {
        panic!("staff-verify visitors still get a record");
    };
    assert_eq!(record.decision(), AdmissionDecision::StaffVerify);
    persistence.settled().await.unwrap();
    assert_eq!(rig.kiosk.summary().await.staff_verify, 1);
}

// ---------------------------------------------------------------------------
// Refusal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn denied_visitor_blocks_until_acknowledged() {
    let rig = rig_with(provider().with_confidence(0), NullRecordSink::new());
    let mut alerts = rig.kiosk.alerts();
    let session = scored_session(&rig, "5555", VisitPurpose::Personal).await;

    let outcome = rig.kiosk.finalize(session.id()).await.unwrap();
    let Finalized::Refused(RejectionReason::LowTrust(assessment)) = outcome else {
        panic!("score 50 must be denied");
    };
    assert_eq!(assessment.total(), 50);
    assert_eq!(
        alerts.recv().await.unwrap(),
        OperatorAlert::SecurityAlert {
            session: session.id().clone(),
            reason: RejectionReason::LowTrust(assessment),
        }
    );

    // asking again repeats the refusal, not the alert
    assert!(matches!(
        rig.kiosk.finalize(session.id()).await.unwrap(),
        Finalized::Refused(RejectionReason::LowTrust(_))
    ));
    assert!(alerts.try_recv().is_err());

    {
        let mut wf = session.try_lock().unwrap();
        assert_eq!(wf.phase(), WorkflowPhase::Rejected);
        let err = wf.begin_capture().unwrap_err();
        assert_eq!(err.class(), ErrorClass::Programming);
    }
    assert!(rig.store.submitted().is_empty());
    assert_eq!(rig.kiosk.summary().await.total, 0);

    rig.kiosk.acknowledge(session.id()).await.unwrap();
    let wf = session.try_lock().unwrap();
    assert_eq!(wf.phase(), WorkflowPhase::Intake);
    assert_eq!(wf.intake().full_name(), "");
}

#[tokio::test]
async fn blocked_visitor_never_gets_a_code() {
    let rig = rig();
    let mut alerts = rig.kiosk.alerts();
    let session = rig.kiosk.start_session().await;
    fill_intake(&session, "999900000000", VisitPurpose::Meeting).await;

    session.try_lock().unwrap().request_code().await.unwrap();
    assert_eq!(session.try_lock().unwrap().phase(), WorkflowPhase::Rejected);
    assert_eq!(rig.signals.calls(SignalCall::Dispatch), 0);
    assert!(rig.signals.dispatched_to().is_empty());

    let outcome = rig.kiosk.finalize(session.id()).await.unwrap();
    assert!(matches!(
        outcome,
        Finalized::Refused(RejectionReason::Blocklisted)
    ));
    assert!(matches!(
        alerts.recv().await.unwrap(),
        OperatorAlert::SecurityAlert {
            reason: RejectionReason::Blocklisted,
            ..
        }
    ));
    rig.kiosk.finalize(session.id()).await.unwrap();
    assert!(alerts.try_recv().is_err());

    rig.kiosk.acknowledge(session.id()).await.unwrap();
    assert_eq!(session.try_lock().unwrap().phase(), WorkflowPhase::Intake);

    // a second blocked visitor on the same session is a new alert
    fill_intake(&session, "999900000000", VisitPurpose::Meeting).await;
    session.try_lock().unwrap().request_code().await.unwrap();
    rig.kiosk.finalize(session.id()).await.unwrap();
    assert!(matches!(
        alerts.try_recv(),
        Ok(OperatorAlert::SecurityAlert {
            reason: RejectionReason::Blocklisted,
            ..
        })
    ));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_failure_leaves_the_admission_standing() {
    let rig = rig_with(provider(), NullRecordSink::failing());
    let mut alerts = rig.kiosk.alerts();
    let session = scored_session(&rig, "9876", VisitPurpose::Interview).await;

    let Finalized::Admitted { record, persistence } =
        rig.kiosk.finalize(session.id()).await.unwrap()
    else {
        panic!("expected admission");
    };
    let before = record.clone();
    let report = persistence.settled().await.unwrap();

    let RemoteOutcome::Failed(error) = &report.remote else {
        panic!("remote store should have failed");
    };
    assert!(matches!(error, RecordError::Unreachable(_)));
    assert_eq!(error.class(), ErrorClass::Persistence);
    assert_eq!(KioskError::from(error.clone()).class(), ErrorClass::Persistence);
    assert_eq!(record, before);
    assert_eq!(record.decision(), AdmissionDecision::Allowed);
    assert_eq!(rig.kiosk.recent(1).await[0].id, record.id().as_str());

    match alerts.recv().await.unwrap() {
        OperatorAlert::PersistenceFailed {
            record_id, sink, ..
        } => {
            assert_eq!(&record_id, record.id());
            assert_eq!(sink, "remote");
        }
        other => panic!("unexpected alert {other:?}"),
    }
}

#[tokio::test]
async fn provider_failure_keeps_the_visitor_on_the_same_step() {
    let rig = rig();
    let session = rig.kiosk.start_session().await;
    fill_intake(&session, "3456", VisitPurpose::Meeting).await;

    rig.signals.inject(SignalCall::Dispatch, Fault::Fail);
    let err = session.try_lock().unwrap().request_code().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Provider(ProviderError::Dispatch(_))));
    assert_eq!(err.class(), ErrorClass::Provider);
    assert_eq!(session.try_lock().unwrap().phase(), WorkflowPhase::Intake);

    rig.signals.heal(SignalCall::Dispatch);
    session.try_lock().unwrap().request_code().await.unwrap();
    assert_eq!(session.try_lock().unwrap().phase(), WorkflowPhase::CodeRequested);
}

#[tokio::test(start_paused = true)]
async fn hung_biometric_call_times_out() {
    let rig = rig();
    let session = rig.kiosk.start_session().await;
    fill_intake(&session, "3456", VisitPurpose::Meeting).await;
    drive_to_capture(&session).await;

    rig.signals.inject(SignalCall::Biometric, Fault::Hang);
    let err = session.try_lock().unwrap().analyze().await.unwrap_err();
    assert_eq!(
        err,
        WorkflowError::Provider(ProviderError::Timeout {
            operation: "biometric analysis",
            timeout_ms: 15_000,
        })
    );
    {
        let wf = session.try_lock().unwrap();
        assert_eq!(wf.phase(), WorkflowPhase::Capturing);
        assert!(wf.assessment().is_none());
        assert!(wf.accepted_capture().is_some());
    }

    rig.signals.heal(SignalCall::Biometric);
    let assessment = session.try_lock().unwrap().analyze().await.unwrap();
    assert_eq!(assessment.total(), 81);
}

#[tokio::test]
async fn expired_code_needs_a_resend() {
    let rig = rig();
    let session = rig.kiosk.start_session().await;
    fill_intake(&session, "3456", VisitPurpose::Meeting).await;
    let mut wf = session.try_lock().unwrap();
    wf.request_code().await.unwrap();

    rig.clock.advance(301);
    assert_eq!(wf.verify_code("482913").await, Err(WorkflowError::CodeExpired));

    wf.resend_code().await.unwrap();
    wf.verify_code("482913").await.unwrap();
    assert_eq!(wf.phase(), WorkflowPhase::CodeVerified);
    assert_eq!(rig.signals.dispatched_to().len(), 2);
}

#[tokio::test]
async fn finalize_while_busy_is_refused() {
    let rig = rig();
    let session = scored_session(&rig, "9876", VisitPurpose::Meeting).await;

    let held = session.try_lock().unwrap();
    let err = rig.kiosk.finalize(session.id()).await.unwrap_err();
    assert!(matches!(err, KioskError::Workflow(WorkflowError::Busy)));
    assert_eq!(held.phase(), WorkflowPhase::Scored);
}

#[tokio::test]
async fn finalize_before_scoring_is_a_contract_error() {
    let rig = rig();
    let session = rig.kiosk.start_session().await;
    let err = rig.kiosk.finalize(session.id()).await.unwrap_err();
    match err {
        KioskError::Workflow(e) => assert_eq!(e.class(), ErrorClass::Programming),
        other => panic!("unexpected error {other}"),
    }
}

// ---------------------------------------------------------------------------
// Sessions and records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sessions_are_independent() {
    let rig = rig();
    let first = rig.kiosk.start_session().await;
    let second = rig.kiosk.start_session().await;
    fill_intake(&first, "9876", VisitPurpose::Meeting).await;

    assert_eq!(second.try_lock().unwrap().intake().full_name(), "");
    assert_eq!(rig.kiosk.active_sessions().await.len(), 2);

    rig.kiosk.abandon(first.id()).await.unwrap();
    assert_eq!(rig.kiosk.active_sessions().await, vec![second.id().clone()]);
    assert!(matches!(
        rig.kiosk.abandon(first.id()).await,
        Err(KioskError::UnknownSession(_))
    ));
    assert!(rig.store.submitted().is_empty());
}

#[tokio::test]
async fn idle_sessions_expire_from_arrival() {
    let rig = rig();
    let walked_away = rig.kiosk.start_session().await;
    fill_intake(&walked_away, "9876", VisitPurpose::Meeting).await;

    rig.clock.advance(1_000);
    let later = rig.kiosk.start_session().await;
    assert_eq!(rig.kiosk.active_sessions().await.len(), 2);

    rig.clock.advance(800);
    assert_eq!(
        rig.kiosk.expire_idle_sessions().await,
        vec![walked_away.id().clone()]
    );
    assert_eq!(rig.kiosk.active_sessions().await, vec![later.id().clone()]);
    assert!(matches!(
        rig.kiosk.finalize(walked_away.id()).await,
        Err(KioskError::UnknownSession(_))
    ));

    // a session mid-operation is left alone
    rig.clock.advance(5_000);
    let held = later.try_lock().unwrap();
    assert!(rig.kiosk.expire_idle_sessions().await.is_empty());
    drop(held);

    // opening a new session sweeps the stale one
    let next = rig.kiosk.start_session().await;
    assert_eq!(rig.kiosk.active_sessions().await, vec![next.id().clone()]);
}

#[tokio::test]
async fn records_carry_kiosk_local_time() {
    let mut config = quiet_config();
    config.records.utc_offset_minutes = 330;
    let clock = Arc::new(NullClock::new(START));
    let store = Arc::new(NullRecordSink::new());
    let kiosk = Kiosk::with_parts(
        config,
        Arc::new(provider()),
        clock,
        Some(store as Arc<dyn RecordSink>),
    )
    .unwrap();

    let session = kiosk.start_session().await;
    fill_intake(&session, "9876", VisitPurpose::Meeting).await;
    drive_to_capture(&session).await;
    session.try_lock().unwrap().analyze().await.unwrap();
    let Finalized::Admitted { persistence, .. } = kiosk.finalize(session.id()).await.unwrap() else {
        panic!("regular visitor should be admitted");
    };
    persistence.settled().await.unwrap();

    let row = &kiosk.recent(1).await[0];
    assert_eq!(row.date, "2024-03-05");
    assert_eq!(row.time, "14:45");
}

#[tokio::test]
async fn seeded_rows_feed_the_dashboard() {
    let rig = rig();
    let row = |id: &str, status: &str| RecordPayload {
        id: id.into(),
        date: "2024-03-05".into(),
        name: format!("Visitor {id}"),
        aadhaar: "1234".into(),
        mobile: "9000000000".into(),
        time: "09:30".into(),
        score: 85,
        status: status.into(),
        purpose: "Meeting".into(),
        photo: String::new(),
    };
    rig.kiosk
        .seed_records([row("d1", "Allowed"), row("d2", "Staff Verify")])
        .await;

    let session = scored_session(&rig, "1234", VisitPurpose::Interview).await;
    if let Finalized::Admitted { persistence, .. } = rig.kiosk.finalize(session.id()).await.unwrap() {
        persistence.settled().await.unwrap();
    }

    let summary = rig.kiosk.summary().await;
    assert_eq!(summary.total, 3);
    assert_eq!(summary.allowed, 2);
    assert_eq!(summary.staff_verify, 1);
    assert_eq!(rig.kiosk.recent(3).await[2].id, "d1");
}

#[tokio::test]
async fn remote_history_needs_a_store() {
    let rig = rig();
    assert!(matches!(
        rig.kiosk.remote_history().await,
        Err(KioskError::NoRemoteStore)
    ));
}

#[tokio::test(start_paused = true)]
async fn reference_kiosk_runs_end_to_end() {
    let kiosk = Kiosk::new(KioskConfig::default()).unwrap();
    let session = kiosk.start_session().await;
    fill_intake(&session, "1111 2222 1234", VisitPurpose::Meeting).await;
    {
        let mut wf = session.try_lock().unwrap();
        wf.request_code().await.unwrap();
        wf.verify_code("000000").await.unwrap();
        wf.begin_capture().unwrap();
        wf.capture(frame()).unwrap();
        wf.retake().unwrap();
        wf.capture(frame()).unwrap();
        wf.accept_capture().unwrap();
        let started = tokio::time::Instant::now();
        let assessment = wf.analyze().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1_500));
        assert_eq!(assessment.total(), 96);
    }

    let Finalized::Admitted { persistence, .. } = kiosk.finalize(session.id()).await.unwrap() else {
        panic!("regular visitor should be admitted");
    };
    let report = persistence.settled().await.unwrap();
    assert_eq!(report.remote, RemoteOutcome::Skipped);
    assert_eq!(kiosk.summary().await.total, 1);
}
