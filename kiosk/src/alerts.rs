//! Operator alert channel.
//!
//! Conditions a person at the front desk must see: a refused visitor and a
//! record the remote store did not take. Delivered over a
//! `tokio::sync::broadcast` channel so any number of screens can listen.

use svims_records::RecordError;
use svims_types::VisitorId;
use svims_verification::{RejectionReason, SessionId};
use tokio::sync::broadcast;

/// Alerts kept for a slow subscriber before it starts missing some.
const ALERT_BUFFER: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperatorAlert {
    /// Entry refused. The session is held until someone acknowledges.
    SecurityAlert {
        session: SessionId,
        reason: RejectionReason,
    },
    /// A finished record did not reach a sink. The admission stands.
    PersistenceFailed {
        record_id: VisitorId,
        sink: &'static str,
        error: RecordError,
    },
}

#[derive(Clone)]
pub struct AlertChannel {
    tx: broadcast::Sender<OperatorAlert>,
}

impl AlertChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(ALERT_BUFFER);
        Self { tx }
    }

    /// Get a receiver for every alert published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OperatorAlert> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. With nobody listening the alert is
    /// dropped; it has already been logged.
    pub fn publish(&self, alert: OperatorAlert) {
        let _ = self.tx.send(alert);
    }
}

impl Default for AlertChannel {
    fn default() -> Self {
        Self::new()
    }
}
