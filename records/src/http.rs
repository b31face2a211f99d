//! HTTP client for the remote record store.

use std::time::Duration;

use async_trait::async_trait;
use svims_types::FixedOffset;
use svims_verification::VisitorRecord;
use tracing::{debug, warn};

use crate::{RecordError, RecordPayload, RecordSink};

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote record store behind a single URL.
///
/// `POST {endpoint}` stores one record; `GET {endpoint}` returns every stored
/// record as a JSON array of the same shape.
pub struct HttpRecordSink {
    endpoint: String,
    /// Offset the `date` and `time` columns are written at.
    offset: FixedOffset,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl HttpRecordSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into(),
            offset: svims_types::utc(),
            http_client,
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Every record the store holds, in the order it returns them.
    pub async fn fetch_history(&self) -> Result<Vec<RecordPayload>, RecordError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(RecordError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let rows: Vec<RecordPayload> = response.json().await.map_err(|e| {
            RecordError::InvalidResponse(format!("failed to parse record history: {e}"))
        })?;
        debug!(sink = "http", rows = rows.len(), "record history fetched");
        Ok(rows)
    }
}

#[async_trait]
impl RecordSink for HttpRecordSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, record: &VisitorRecord) -> Result<(), RecordError> {
        let payload = RecordPayload::from_record_at(record, self.offset)?;
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            warn!(sink = "http", record = %record.id(), status = %response.status(), "record store refused record");
            return Err(RecordError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        debug!(sink = "http", record = %record.id(), "record stored remotely");
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> RecordError {
    if e.is_timeout() {
        RecordError::Unreachable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        RecordError::Unreachable(format!("connection failed: {e}"))
    } else {
        RecordError::RequestFailed(e.to_string())
    }
}
