//! Long-Running Operation Module
//!
//! Operation handles, service-side snapshots and the completion contract for
//! annotation jobs. An operation moves `Pending -> Succeeded | Failed` and is
//! terminal once the service marks it done.

mod worker;

pub use worker::*;

use serde::{Deserialize, Serialize};

use crate::core::annotations::{ServiceStatus, VideoAnnotationResults};
use crate::core::{CoreError, CoreResult, OperationName};

// =============================================================================
// Operation State
// =============================================================================

/// Lifecycle state of an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationState {
    /// Submitted, not yet finished
    Pending,
    /// Finished without error
    Succeeded,
    /// Finished with an error
    Failed,
}

impl OperationState {
    /// Whether the operation is in a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::Pending)
    }
}

// =============================================================================
// Operation Handle
// =============================================================================

/// Identifies a submitted operation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationHandle {
    /// Provider identifier (e.g., "google_cloud")
    pub provider: String,
    /// Service-assigned operation name
    pub name: OperationName,
    /// Unix timestamp when submitted
    pub submitted_at: i64,
}

// =============================================================================
// Operation Snapshot (wire)
// =============================================================================

/// Progress of one video within an operation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnnotationProgress {
    #[serde(default)]
    pub input_uri: String,
    #[serde(default)]
    pub progress_percent: i32,
}

/// Operation metadata reported while running
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateVideoProgress {
    #[serde(default)]
    pub annotation_progress: Vec<VideoAnnotationProgress>,
}

/// Operation payload on success
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateVideoResponse {
    #[serde(default)]
    pub annotation_results: Vec<VideoAnnotationResults>,
}

/// State of an operation as reported by the service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSnapshot {
    #[serde(default)]
    pub name: OperationName,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AnnotateVideoResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnnotateVideoProgress>,
}

impl OperationSnapshot {
    /// A snapshot of an operation still running
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A finished snapshot carrying results
    pub fn succeeded(name: impl Into<String>, results: Vec<VideoAnnotationResults>) -> Self {
        Self {
            name: name.into(),
            done: true,
            response: Some(AnnotateVideoResponse {
                annotation_results: results,
            }),
            ..Default::default()
        }
    }

    /// A finished snapshot carrying an error
    pub fn failed(name: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: Some(ServiceStatus {
                code,
                message: message.into(),
            }),
            ..Default::default()
        }
    }

    /// Lifecycle state derived from the snapshot
    pub fn state(&self) -> OperationState {
        match (self.done, &self.error) {
            (false, _) => OperationState::Pending,
            (true, Some(_)) => OperationState::Failed,
            (true, None) => OperationState::Succeeded,
        }
    }

    /// Progress percentage of the first video, when reported
    pub fn progress_percent(&self) -> Option<i32> {
        self.metadata
            .as_ref()
            .and_then(|m| m.annotation_progress.first())
            .map(|p| p.progress_percent)
    }
}

// =============================================================================
// Completed Operation
// =============================================================================

/// A finished operation, handed to the completion callback
#[derive(Clone, Debug)]
pub struct CompletedOperation {
    snapshot: OperationSnapshot,
}

impl CompletedOperation {
    pub(crate) fn new(snapshot: OperationSnapshot) -> Self {
        debug_assert!(snapshot.done);
        Self { snapshot }
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    /// Terminal state (`Succeeded` or `Failed`)
    pub fn state(&self) -> OperationState {
        self.snapshot.state()
    }

    /// Error reported by the service, if the operation failed
    pub fn error(&self) -> Option<&ServiceStatus> {
        self.snapshot.error.as_ref()
    }

    /// Raw snapshot
    pub fn snapshot(&self) -> &OperationSnapshot {
        &self.snapshot
    }

    /// All per-video results, or the operation's error
    pub fn into_results(self) -> CoreResult<Vec<VideoAnnotationResults>> {
        if let Some(status) = self.snapshot.error {
            return Err(CoreError::OperationFailed {
                code: status.code,
                message: status.message,
            });
        }

        Ok(self
            .snapshot
            .response
            .map(|r| r.annotation_results)
            .unwrap_or_default())
    }

    /// Results of the first (and only) submitted video.
    ///
    /// One request carries one video, so only the first result is honored.
    pub fn into_first_result(self) -> CoreResult<VideoAnnotationResults> {
        let name = self.snapshot.name.clone();
        let results = self.into_results()?;

        if results.len() > 1 {
            tracing::warn!(
                "Operation {} returned {} results; using the first",
                name,
                results.len()
            );
        }

        let first = results.into_iter().next().ok_or_else(|| {
            CoreError::NotFound(format!("Operation {} returned no annotation results", name))
        })?;

        if let Some(status) = &first.error {
            return Err(CoreError::OperationFailed {
                code: status.code,
                message: status.message.clone(),
            });
        }

        Ok(first)
    }
}

// =============================================================================
// Tests
// =============================================================================
