//! Hands each finished record to the local list and the remote store.
//!
//! The two are independent: the local list is updated first and always,
//! the remote store is best-effort and its outcome is only reported.

use std::sync::Arc;

use svims_types::VisitorId;
use svims_verification::VisitorRecord;
use tracing::{info, warn};

use crate::{LocalRecordCache, RecordError, RecordSink};

/// What happened at the remote store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// No remote store is configured.
    Skipped,
    Stored,
    Failed(RecordError),
}

/// Per-sink result of one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReport {
    pub record_id: VisitorId,
    pub local: Result<(), RecordError>,
    pub remote: RemoteOutcome,
}

impl SubmissionReport {
    pub fn is_clean(&self) -> bool {
        self.local.is_ok() && !matches!(self.remote, RemoteOutcome::Failed(_))
    }

    /// Every sink failure, tagged with the sink it came from.
    pub fn failures(&self) -> Vec<(&'static str, &RecordError)> {
        let mut failures = Vec::new();
        if let Err(e) = &self.local {
            failures.push(("local", e));
        }
        if let RemoteOutcome::Failed(e) = &self.remote {
            failures.push(("remote", e));
        }
        failures
    }
}

#[derive(Clone)]
pub struct RecordFanout {
    local: Arc<LocalRecordCache>,
    remote: Option<Arc<dyn RecordSink>>,
}

impl RecordFanout {
    pub fn new(local: Arc<LocalRecordCache>, remote: Option<Arc<dyn RecordSink>>) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &Arc<LocalRecordCache> {
        &self.local
    }

    pub fn remote(&self) -> Option<&Arc<dyn RecordSink>> {
        self.remote.as_ref()
    }

    pub async fn submit(&self, record: &VisitorRecord) -> SubmissionReport {
        let local = self.local.submit(record).await;
        if let Err(e) = &local {
            warn!(record = %record.id(), error = %e, "record not cached locally");
        }

        let remote = match &self.remote {
            None => RemoteOutcome::Skipped,
            Some(sink) => match sink.submit(record).await {
                Ok(()) => RemoteOutcome::Stored,
                Err(e) => {
                    warn!(record = %record.id(), sink = sink.name(), error = %e, "remote record submission failed");
                    RemoteOutcome::Failed(e)
                }
            },
        };

        let report = SubmissionReport {
            record_id: record.id().clone(),
            local,
            remote,
        };
        if report.is_clean() {
            info!(record = %record.id(), decision = %record.decision(), "record submitted");
        }
        report
    }
}
