//! # Image Worker Interface
//!
//! The engine core never touches image data; decoding and manipulation run
//! in an isolated worker process that communicates via JSON messages keyed
//! by a per-request identifier. This module owns the message types and the
//! request bookkeeping, not the worker itself.
//!
//! ## Protocol
//!
//! ```text
//! Host                          Worker Process
//!  │                               │
//!  ├── {"id": "worker_request_1", "actions": [{"action": "read_as_data_url"}]}
//!  │                               │
//!  └── {"request_id": "worker_request_1", "result": {...}, "done": true}
//! ```
//!
//! ## Supersession
//!
//! Exactly one request is in flight per tracker. Starting a new request
//! replaces the active id; responses for superseded ids are dropped on
//! arrival. Latest-request-wins, no explicit abort.
//!
//! Worker failure is a reportable [`WorkerError`] value, distinct from
//! "still loading", and never fatal to the host.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorkerError {
    #[error("Image worker failed: {0}")]
    Failed(String),

    #[error("Image worker exited before completing request {0}")]
    Incomplete(RequestId),
}

/// Identifier for one logical worker request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker_request_{}", self.0)
    }
}

/// An image manipulation the worker performs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ImageAction {
    /// Decode the image and return it as a data URL
    ReadAsDataUrl,
    Flip { horizontal: bool, vertical: bool },
    SetBrightness { value: i32 },
    SetContrast { value: i32 },
    Invert,
}

/// A request sent to the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: RequestId,
    pub actions: Vec<ImageAction>,
}

/// The successful payload of one action within a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Index of the action within the request this result answers
    pub action_id: usize,
    pub data_url: String,
}

/// A message received from the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ActionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True on the final message of a request
    #[serde(default)]
    pub done: bool,
}

/// Worker availability as seen by the host UI
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerStatus {
    pub is_busy: bool,
    pub error: Option<String>,
}

/// Tracks the single in-flight request and routes responses
///
/// Owned by the host alongside the engine; the engine itself never blocks
/// on the worker.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    active: Option<RequestId>,
    status: WorkerStatus,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding any active one
    pub fn begin(&mut self, actions: Vec<ImageAction>) -> WorkerRequest {
        if let Some(superseded) = self.active {
            debug!("request {} superseded before completion", superseded);
        }
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.active = Some(id);
        self.status = WorkerStatus {
            is_busy: true,
            error: None,
        };
        WorkerRequest { id, actions }
    }

    /// Accepts a worker message
    ///
    /// Returns `None` for stale responses (superseded or unknown request
    /// ids); otherwise the action result or the failure, as a value.
    pub fn accept(
        &mut self,
        response: WorkerResponse,
    ) -> Option<Result<Option<ActionResult>, WorkerError>> {
        if self.active != Some(response.request_id) {
            warn!(
                "dropping stale worker response for {}",
                response.request_id
            );
            return None;
        }

        if response.done {
            self.active = None;
            self.status.is_busy = false;
        }

        if let Some(message) = response.error {
            self.active = None;
            self.status = WorkerStatus {
                is_busy: false,
                error: Some(message.clone()),
            };
            return Some(Err(WorkerError::Failed(message)));
        }

        Some(Ok(response.result))
    }

    /// Marks the worker as crashed while a request was in flight
    pub fn fail_active(&mut self) -> Option<WorkerError> {
        let id = self.active.take()?;
        let error = WorkerError::Incomplete(id);
        self.status = WorkerStatus {
            is_busy: false,
            error: Some(error.to_string()),
        };
        Some(error)
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy
    }

    pub fn status(&self) -> &WorkerStatus {
        &self.status
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active
    }
}
