//! Destination for finalized visitor records.

use async_trait::async_trait;
use svims_verification::VisitorRecord;

use crate::RecordError;

/// Anything that can store a finished record: a remote store, a local list,
/// an audit log.
///
/// Sinks are called only after a decision has been acted upon. A failing
/// sink never changes the record or the outcome it describes.
#[async_trait]
pub trait RecordSink: Send + Sync {
    fn name(&self) -> &str;

    async fn submit(&self, record: &VisitorRecord) -> Result<(), RecordError>;
}
