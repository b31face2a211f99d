//! Where finished visitor records go.
//!
//! - [`LocalRecordCache`]: the kiosk's own newest-first list, feeding the dashboard.
//! - [`HttpRecordSink`]: a remote store taking one JSON record per `POST`.
//! - [`RecordFanout`]: submits to both and reports each outcome separately.

pub mod cache;
pub mod error;
pub mod fanout;
pub mod http;
pub mod payload;
pub mod sink;

pub use cache::{LocalRecordCache, RecordSummary};
pub use error::RecordError;
pub use fanout::{RecordFanout, RemoteOutcome, SubmissionReport};
pub use http::HttpRecordSink;
pub use payload::RecordPayload;
pub use sink::RecordSink;
