//! In-memory list of recent visitors backing the dashboard.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::Serialize;
use svims_types::{AdmissionDecision, FixedOffset};
use svims_verification::VisitorRecord;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{RecordError, RecordPayload, RecordSink};

/// Default number of records kept.
pub const DEFAULT_CAPACITY: usize = 500;

/// Overview counts for the dashboard cards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub total: usize,
    pub allowed: usize,
    pub staff_verify: usize,
    pub denied: usize,
}

/// Bounded, newest-first record list. Once full, the oldest record is dropped.
pub struct LocalRecordCache {
    capacity: usize,
    offset: FixedOffset,
    rows: RwLock<VecDeque<RecordPayload>>,
}

impl LocalRecordCache {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            offset: svims_types::utc(),
            rows: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
        }
    }

    /// Render record dates and times at `offset` instead of UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Load rows in oldest-first order, e.g. demo visitors or fetched history.
    pub async fn seed(&self, rows: impl IntoIterator<Item = RecordPayload>) {
        let mut list = self.rows.write().await;
        for row in rows {
            push_front_bounded(&mut list, row, self.capacity);
        }
    }

    pub async fn insert(&self, row: RecordPayload) {
        let mut list = self.rows.write().await;
        push_front_bounded(&mut list, row, self.capacity);
    }

    /// Up to `n` records, newest first.
    pub async fn recent(&self, n: usize) -> Vec<RecordPayload> {
        self.rows.read().await.iter().take(n).cloned().collect()
    }

    pub async fn summary(&self) -> RecordSummary {
        let list = self.rows.read().await;
        let mut summary = RecordSummary {
            total: list.len(),
            ..RecordSummary::default()
        };
        for row in list.iter() {
            match row.decision() {
                Some(AdmissionDecision::Allowed) => summary.allowed += 1,
                Some(AdmissionDecision::StaffVerify) => summary.staff_verify += 1,
                Some(AdmissionDecision::Denied) => summary.denied += 1,
                None => {}
            }
        }
        summary
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl Default for LocalRecordCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn push_front_bounded(list: &mut VecDeque<RecordPayload>, row: RecordPayload, capacity: usize) {
    list.push_front(row);
    list.truncate(capacity);
}

#[async_trait]
impl RecordSink for LocalRecordCache {
    fn name(&self) -> &str {
        "local"
    }

    async fn submit(&self, record: &VisitorRecord) -> Result<(), RecordError> {
        let row = RecordPayload::from_record_at(record, self.offset)?;
        self.insert(row).await;
        debug!(sink = "local", record = %record.id(), "record cached");
        Ok(())
    }
}
