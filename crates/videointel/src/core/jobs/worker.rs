//! Annotation Job Client
//!
//! Submits annotation requests and tracks each resulting long-running
//! operation on a background poller task. The completion callback registered
//! at submission runs exactly once, on the poller, when the service reports
//! the operation done; its return value is delivered to the waiter over a
//! oneshot channel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::{
    annotations::{AnalysisRequest, AnnotationApi, GoogleCloudProvider},
    jobs::{CompletedOperation, OperationHandle, OperationSnapshot},
    settings::ClientSettings,
    CoreError, CoreResult,
};

// =============================================================================
// Poll Configuration
// =============================================================================

/// How the poller checks on an operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between polls
    pub interval: Duration,
    /// Give up waiting after this long; `None` waits indefinitely
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(crate::core::settings::DEFAULT_POLL_INTERVAL_SECS),
            max_wait: None,
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// A submitted operation whose completion callback produces a `T`
///
/// Dropping it before completion stops the poller; the completion callback
/// then never runs.
#[derive(Debug)]
pub struct Operation<T> {
    handle: OperationHandle,
    result_rx: oneshot::Receiver<CoreResult<T>>,
    poller: JoinHandle<()>,
}

impl<T> Operation<T> {
    /// Operation handle
    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    /// Service-assigned operation name
    pub fn name(&self) -> &str {
        &self.handle.name
    }

    /// Whether the poller has finished (callback delivered or wait aborted)
    pub fn is_done(&self) -> bool {
        self.poller.is_finished()
    }

    /// Waits until the operation finishes and returns the callback's result.
    ///
    /// Errors raised inside the callback, poll failures, and an exceeded wait
    /// limit are all surfaced here.
    pub async fn wait_until_done(self) -> CoreResult<T> {
        let Operation {
            handle,
            result_rx,
            poller,
        } = self;

        match result_rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                let reason = match poller.await {
                    Err(e) if e.is_panic() => "completion callback panicked",
                    _ => "poller stopped without a result",
                };
                Err(CoreError::OperationAbandoned(format!(
                    "{}: {}",
                    handle.name, reason
                )))
            }
        }
    }

    /// Blocking variant of [`Operation::wait_until_done`].
    ///
    /// Must not be called from within an async runtime worker thread.
    pub fn blocking_wait_until_done(self) -> CoreResult<T> {
        let name = self.handle.name;
        self.result_rx.blocking_recv().unwrap_or_else(|_| {
            Err(CoreError::OperationAbandoned(format!(
                "{}: poller stopped without a result",
                name
            )))
        })
    }
}

// =============================================================================
// Annotation Client
// =============================================================================

/// Long-lived client for submitting annotation jobs
#[derive(Clone)]
pub struct AnnotationClient {
    api: Arc<dyn AnnotationApi>,
    poll: PollConfig,
}

impl std::fmt::Debug for AnnotationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationClient")
            .field("provider", &self.api.name())
            .field("poll", &self.poll)
            .finish()
    }
}

impl AnnotationClient {
    /// Creates a client over any annotation service
    pub fn new(api: Arc<dyn AnnotationApi>, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    /// Creates a client talking to the Google Cloud REST API
    pub fn from_settings(settings: &ClientSettings) -> CoreResult<Self> {
        let provider = GoogleCloudProvider::from_settings(settings)?;
        Ok(Self::new(Arc::new(provider), settings.poll_config()))
    }

    /// Polling behaviour
    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Submits a request and registers the completion callback.
    ///
    /// Returns as soon as the service has accepted the job. `on_complete`
    /// runs once, off the caller's task, when the operation is observed done;
    /// it is not invoked if polling fails or the wait limit is exceeded.
    pub async fn submit<T, F>(
        &self,
        request: AnalysisRequest,
        on_complete: F,
    ) -> CoreResult<Operation<T>>
    where
        T: Send + 'static,
        F: FnOnce(CompletedOperation) -> CoreResult<T> + Send + 'static,
    {
        request.validate()?;

        let name = self.api.annotate(&request).await?;
        info!(
            "Annotation job submitted: provider={}, operation={}, features={:?}",
            self.api.name(),
            name,
            request.features
        );

        let handle = OperationHandle {
            provider: self.api.name().to_string(),
            name: name.clone(),
            submitted_at: chrono::Utc::now().timestamp(),
        };

        let (mut result_tx, result_rx) = oneshot::channel();
        let api = Arc::clone(&self.api);
        let poll = self.poll.clone();

        let poller = tokio::spawn(async move {
            let polled = tokio::select! {
                polled = await_completion(api.as_ref(), &name, &poll) => polled,
                _ = result_tx.closed() => {
                    debug!("Operation {} dropped before completion; polling stopped", name);
                    return;
                }
            };

            let outcome = match polled {
                Ok(snapshot) => {
                    info!("Operation {} finished: {:?}", name, snapshot.state());
                    on_complete(CompletedOperation::new(snapshot))
                }
                Err(e) => Err(e),
            };

            if result_tx.send(outcome).is_err() {
                debug!("Operation {} finished after its waiter was dropped", name);
            }
        });

        Ok(Operation {
            handle,
            result_rx,
            poller,
        })
    }
}

/// Polls until the operation is done or the wait limit is exceeded
async fn await_completion(
    api: &dyn AnnotationApi,
    name: &str,
    poll: &PollConfig,
) -> CoreResult<OperationSnapshot> {
    let started = Instant::now();

    loop {
        let snapshot = api.get_operation(name).await?;
        if snapshot.done {
            return Ok(snapshot);
        }

        debug!(
            "Operation {} pending (progress: {})",
            name,
            snapshot
                .progress_percent()
                .map(|p| format!("{}%", p))
                .unwrap_or_else(|| "unknown".to_string())
        );

        let delay = match poll.max_wait {
            Some(max_wait) => {
                let remaining = max_wait.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(CoreError::Timeout(format!(
                        "Operation {} not finished after {:?}",
                        name, max_wait
                    )));
                }
                poll.interval.min(remaining)
            }
            None => poll.interval,
        };

        tokio::time::sleep(delay).await;
    }
}

// =============================================================================
// Tests
// =============================================================================
