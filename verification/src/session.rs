//! Session handles.
//!
//! A kiosk hands one [`SharedWorkflow`] per visitor to its UI. Only one
//! operation may run on a workflow at a time; a second caller gets
//! [`WorkflowError::Busy`] instead of queueing behind the first.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::workflow::{VerificationWorkflow, WorkflowContext};
use crate::WorkflowError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cloneable handle to a single in-flight workflow.
#[derive(Clone)]
pub struct SharedWorkflow {
    id: SessionId,
    inner: Arc<Mutex<VerificationWorkflow>>,
}

impl SharedWorkflow {
    pub fn start(ctx: WorkflowContext) -> Self {
        Self::from_workflow(VerificationWorkflow::new(ctx))
    }

    pub fn from_workflow(workflow: VerificationWorkflow) -> Self {
        Self {
            id: workflow.id().clone(),
            inner: Arc::new(Mutex::new(workflow)),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Exclusive access for one operation. Fails with `Busy` while another
    /// operation holds the workflow.
    pub fn try_lock(&self) -> Result<OwnedMutexGuard<VerificationWorkflow>, WorkflowError> {
        self.inner
            .clone()
            .try_lock_owned()
            .map_err(|_| WorkflowError::Busy)
    }

    /// Drop this handle's claim on the workflow. The last handle to go
    /// discards the workflow's state.
    pub fn abandon(self) {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().abandon(),
            Err(_) => tracing::debug!(session = %self.id, "abandoned handle; workflow still referenced"),
        }
    }
}
