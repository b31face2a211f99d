//! Nullable record sink: remembers what it was given.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use svims_records::{RecordError, RecordSink};
use svims_verification::VisitorRecord;

/// A record sink that keeps submissions in memory and can be told to fail.
#[derive(Debug, Default)]
pub struct NullRecordSink {
    failing: AtomicBool,
    submitted: Mutex<Vec<VisitorRecord>>,
}

impl NullRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every record, like an unreachable store.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Records accepted so far, oldest first.
    pub fn submitted(&self) -> Vec<VisitorRecord> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RecordSink for NullRecordSink {
    fn name(&self) -> &str {
        "null"
    }

    async fn submit(&self, record: &VisitorRecord) -> Result<(), RecordError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RecordError::Unreachable("null sink set to fail".into()));
        }
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
