//! The kiosk service: owns visitor sessions and everything around them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use svims_records::{
    HttpRecordSink, LocalRecordCache, RecordFanout, RecordPayload, RecordSink, RecordSummary,
    SubmissionReport,
};
use svims_scoring::TrustScoreEngine;
use svims_verification::{
    Clock, Conclusion, ReferenceSignals, RejectionReason, SessionId, SharedWorkflow,
    SignalProvider, SystemClock, VisitorRecord, WorkflowContext, WorkflowPhase,
};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::alerts::{AlertChannel, OperatorAlert};
use crate::config::KioskConfig;
use crate::KioskError;

/// Outcome of [`Kiosk::finalize`].
#[derive(Debug)]
pub enum Finalized {
    /// The visitor may go in. The record is final; persistence runs on its own.
    Admitted {
        record: VisitorRecord,
        persistence: PersistenceTicket,
    },
    /// Entry refused. The session stays open until acknowledged.
    Refused(RejectionReason),
}

/// Handle to a record submission running in the background.
#[derive(Debug)]
pub struct PersistenceTicket(JoinHandle<SubmissionReport>);

impl PersistenceTicket {
    /// Wait for every sink to answer.
    pub async fn settled(self) -> Result<SubmissionReport, KioskError> {
        self.0
            .await
            .map_err(|e| KioskError::Persistence(e.to_string()))
    }
}

pub struct Kiosk {
    config: Arc<KioskConfig>,
    ctx: WorkflowContext,
    fanout: RecordFanout,
    history: Option<Arc<HttpRecordSink>>,
    sessions: RwLock<HashMap<SessionId, SharedWorkflow>>,
    /// Refused sessions whose security alert is already out.
    alerted: RwLock<HashSet<SessionId>>,
    alerts: AlertChannel,
}

impl Kiosk {
    /// Build a kiosk with the reference signal provider and, when an
    /// endpoint is configured, the HTTP record store.
    pub fn new(config: KioskConfig) -> Result<Self, KioskError> {
        let signals = Arc::new(ReferenceSignals::new(
            config.directory.clone(),
            config.reference_delays(),
        ));
        let offset = config.display_offset()?;
        let history = config.records.endpoint.as_ref().map(|url| {
            Arc::new(HttpRecordSink::new(url.clone(), config.records_timeout()).with_offset(offset))
        });
        let remote = history
            .clone()
            .map(|sink| sink as Arc<dyn RecordSink>);
        Self::assemble(config, signals, Arc::new(SystemClock), remote, history)
    }

    /// Build a kiosk around caller-supplied collaborators.
    pub fn with_parts(
        config: KioskConfig,
        signals: Arc<dyn SignalProvider>,
        clock: Arc<dyn Clock>,
        remote: Option<Arc<dyn RecordSink>>,
    ) -> Result<Self, KioskError> {
        Self::assemble(config, signals, clock, remote, None)
    }

    fn assemble(
        config: KioskConfig,
        signals: Arc<dyn SignalProvider>,
        clock: Arc<dyn Clock>,
        remote: Option<Arc<dyn RecordSink>>,
        history: Option<Arc<HttpRecordSink>>,
    ) -> Result<Self, KioskError> {
        config.validate()?;
        let engine = Arc::new(TrustScoreEngine::new(config.scoring.clone())?);
        let ctx = WorkflowContext::new(signals, engine)
            .with_clock(clock)
            .with_timeouts(config.workflow_timeouts())
            .with_code_policy(config.code);
        let cache = Arc::new(
            LocalRecordCache::with_capacity(config.records.cache_capacity)
                .with_offset(config.display_offset()?),
        );

        info!(
            provider = ctx.signals.name(),
            remote = remote.as_ref().map(|s| s.name()).unwrap_or("none"),
            allow_threshold = config.scoring.allow_threshold,
            deny_threshold = config.scoring.deny_threshold,
            utc_offset_minutes = config.records.utc_offset_minutes,
            "kiosk ready"
        );

        Ok(Self {
            config: Arc::new(config),
            ctx,
            fanout: RecordFanout::new(cache, remote),
            history,
            sessions: RwLock::new(HashMap::new()),
            alerted: RwLock::new(HashSet::new()),
            alerts: AlertChannel::new(),
        })
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    // ── Sessions ───────────────────────────────────────────────────────

    /// Open a fresh registration at the intake step. Sessions left idle past
    /// `sessions.idle_secs` are swept first.
    pub async fn start_session(&self) -> SharedWorkflow {
        self.expire_idle_sessions().await;
        let session = SharedWorkflow::start(self.ctx.clone());
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session.clone());
        info!(session = %session.id(), "session started");
        session
    }

    pub async fn session(&self, id: &SessionId) -> Option<SharedWorkflow> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Close out a scored or refused session.
    ///
    /// An admitted visitor's session ends here and its record is handed to
    /// the sinks in the background. A refused visitor raises one security
    /// alert and the session waits for [`acknowledge`](Self::acknowledge);
    /// finalizing it again returns the same refusal without a second alert.
    pub async fn finalize(&self, id: &SessionId) -> Result<Finalized, KioskError> {
        let session = self.require(id).await?;
        let conclusion = {
            let mut wf = session.try_lock()?;
            match (wf.phase(), wf.rejection().copied()) {
                (WorkflowPhase::Rejected, Some(reason)) => Conclusion::Refused(reason),
                _ => wf.conclude()?,
            }
        };

        match conclusion {
            Conclusion::Admitted(record) => {
                self.sessions.write().await.remove(id);
                let persistence = self.persist(record.clone());
                Ok(Finalized::Admitted {
                    record,
                    persistence,
                })
            }
            Conclusion::Refused(reason) => {
                if self.alerted.write().await.insert(id.clone()) {
                    warn!(session = %id, ?reason, "security alert raised");
                    self.alerts.publish(OperatorAlert::SecurityAlert {
                        session: id.clone(),
                        reason,
                    });
                }
                Ok(Finalized::Refused(reason))
            }
        }
    }

    /// Dismiss a security alert; the session reopens at intake.
    pub async fn acknowledge(&self, id: &SessionId) -> Result<(), KioskError> {
        let session = self.require(id).await?;
        session.try_lock()?.acknowledge()?;
        self.alerted.write().await.remove(id);
        Ok(())
    }

    /// Drop a session without a record. Nothing was persisted, so nothing
    /// needs undoing.
    pub async fn abandon(&self, id: &SessionId) -> Result<(), KioskError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| KioskError::UnknownSession(id.clone()))?;
        self.alerted.write().await.remove(id);
        info!(session = %id, "session abandoned");
        session.abandon();
        Ok(())
    }

    /// Drop every session whose visitor arrived `sessions.idle_secs` or more
    /// ago, refused ones included. Sessions with an operation in flight are
    /// kept. Returns the dropped ids.
    pub async fn expire_idle_sessions(&self) -> Vec<SessionId> {
        let now = self.ctx.clock.now();
        let idle_secs = self.config.sessions.idle_secs;
        let mut sessions = self.sessions.write().await;
        let stale: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, session)| {
                session
                    .try_lock()
                    .map(|wf| wf.intake().arrived_at().has_expired(idle_secs, now))
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();

        let mut alerted = self.alerted.write().await;
        for id in &stale {
            alerted.remove(id);
            if let Some(session) = sessions.remove(id) {
                info!(session = %id, idle_secs, "idle session expired");
                session.abandon();
            }
        }
        stale
    }

    async fn require(&self, id: &SessionId) -> Result<SharedWorkflow, KioskError> {
        self.session(id)
            .await
            .ok_or_else(|| KioskError::UnknownSession(id.clone()))
    }

    fn persist(&self, record: VisitorRecord) -> PersistenceTicket {
        let fanout = self.fanout.clone();
        let alerts = self.alerts.clone();
        PersistenceTicket(tokio::spawn(async move {
            let report = fanout.submit(&record).await;
            for (sink, error) in report.failures() {
                alerts.publish(OperatorAlert::PersistenceFailed {
                    record_id: report.record_id.clone(),
                    sink,
                    error: error.clone(),
                });
            }
            report
        }))
    }

    // ── Records ────────────────────────────────────────────────────────

    pub async fn summary(&self) -> RecordSummary {
        self.fanout.local().summary().await
    }

    /// Up to `n` records, newest first.
    pub async fn recent(&self, n: usize) -> Vec<RecordPayload> {
        self.fanout.local().recent(n).await
    }

    /// Pre-load the dashboard list, oldest first.
    pub async fn seed_records(&self, rows: impl IntoIterator<Item = RecordPayload>) {
        self.fanout.local().seed(rows).await;
    }

    /// Everything the remote record store holds.
    pub async fn remote_history(&self) -> Result<Vec<RecordPayload>, KioskError> {
        let store = self.history.as_ref().ok_or(KioskError::NoRemoteStore)?;
        Ok(store.fetch_history().await?)
    }

    // ── Alerts ─────────────────────────────────────────────────────────

    pub fn alerts(&self) -> broadcast::Receiver<OperatorAlert> {
        self.alerts.subscribe()
    }
}
