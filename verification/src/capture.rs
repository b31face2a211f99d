//! Still images taken on the capture screen.

use serde::Serialize;
use svims_types::Timestamp;

use crate::WorkflowError;

/// Where the image lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CaptureData {
    /// Raw encoded image, e.g. a JPEG frame from the kiosk camera.
    Image { mime: String, bytes: Vec<u8> },
    /// Reference to an image held elsewhere.
    Uri(String),
}

/// One still frame. Opaque to the workflow; only signal providers look inside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BiometricCapture {
    data: CaptureData,
    captured_at: Timestamp,
}

impl BiometricCapture {
    pub fn image(mime: impl Into<String>, bytes: Vec<u8>, captured_at: Timestamp) -> Self {
        Self {
            data: CaptureData::Image {
                mime: mime.into(),
                bytes,
            },
            captured_at,
        }
    }

    pub fn uri(uri: impl Into<String>, captured_at: Timestamp) -> Self {
        Self {
            data: CaptureData::Uri(uri.into()),
            captured_at,
        }
    }

    pub fn data(&self) -> &CaptureData {
        &self.data
    }

    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        match &self.data {
            CaptureData::Image { bytes, .. } if bytes.is_empty() => {
                Err(WorkflowError::validation("capture", "image is empty"))
            }
            CaptureData::Image { mime, .. } if !mime.starts_with("image/") => Err(
                WorkflowError::validation("capture", format!("unsupported media type {mime:?}")),
            ),
            CaptureData::Uri(uri) if uri.trim().is_empty() => {
                Err(WorkflowError::validation("capture", "image reference is empty"))
            }
            _ => Ok(()),
        }
    }
}

/// Pending / accepted capture pair.
///
/// A pending still can be discarded any number of times; accepting promotes
/// it and replaces any earlier accepted still.
#[derive(Clone, Debug, Default)]
pub struct CaptureSlot {
    pending: Option<BiometricCapture>,
    accepted: Option<BiometricCapture>,
}

impl CaptureSlot {
    pub fn store(&mut self, capture: BiometricCapture) {
        self.pending = Some(capture);
    }

    /// Drop the pending still. Returns whether there was one.
    pub fn discard(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn accept(&mut self) -> Result<&BiometricCapture, WorkflowError> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| WorkflowError::validation("capture", "no pending capture to accept"))?;
        Ok(&*self.accepted.insert(pending))
    }

    pub fn pending(&self) -> Option<&BiometricCapture> {
        self.pending.as_ref()
    }

    pub fn accepted(&self) -> Option<&BiometricCapture> {
        self.accepted.as_ref()
    }

    pub fn take_accepted(&mut self) -> Option<BiometricCapture> {
        self.pending = None;
        self.accepted.take()
    }
}
