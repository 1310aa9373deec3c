//! Bounded trigger orchestration.
//!
//! The invoker runs on its own task so that waiting for it can be cut off at
//! a wall-clock deadline no matter what the remote call does.

use runscope_core::{BuildResultHolder, LogSink, TriggerInvoker, TriggerOutcome, TriggerRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

/// Deadline offset used when the configured timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Aborts the worker task when dropped, on every exit path.
struct WorkerGuard<T>(JoinHandle<T>);

impl<T> Drop for WorkerGuard<T> {
    fn drop(&mut self) {
        if !self.0.is_finished() {
            debug!("Cancelling trigger task");
        }
        self.0.abort();
    }
}

/// Dispatches a trigger invoker and waits for it with a deadline.
#[derive(Clone)]
pub struct BoundedOrchestrator {
    invoker: Arc<dyn TriggerInvoker>,
}

impl BoundedOrchestrator {
    pub fn new(invoker: Arc<dyn TriggerInvoker>) -> Self {
        Self { invoker }
    }

    /// Run one invocation and log its configuration and outcome.
    pub async fn run(&self, request: &TriggerRequest, log: &dyn LogSink) -> TriggerOutcome {
        self.execute(request, log, None).await
    }

    /// Run one invocation and record the build result.
    ///
    /// The result is success only for [`TriggerOutcome::Passed`].
    pub async fn perform(
        &self,
        request: &TriggerRequest,
        log: &dyn LogSink,
        build: &dyn BuildResultHolder,
    ) -> TriggerOutcome {
        self.execute(request, log, Some(build)).await
    }

    async fn execute(
        &self,
        request: &TriggerRequest,
        log: &dyn LogSink,
        build: Option<&dyn BuildResultHolder>,
    ) -> TriggerOutcome {
        log.println("Build Trigger Configuration:");
        log.println(&format!("Trigger End Point:{}", request.endpoint()));
        log.println(&format!("Access Token:{}", request.display_token()));
        log.println(&format!("Timeout:{}", request.timeout_seconds()));

        let outcome = self.await_outcome(request).await;

        if let Some(build) = build {
            let result = outcome.build_result();
            if !build.set_result(result) {
                warn!(result = %result, "Build result already recorded, keeping the first one");
            }
        }

        match &outcome {
            TriggerOutcome::Passed => info!(endpoint = %request.endpoint(), "Test run passed"),
            TriggerOutcome::Failed { status } => {
                warn!(endpoint = %request.endpoint(), status = %status, "Test run did not pass")
            }
            TriggerOutcome::TimedOut { timeout_seconds } => {
                warn!(endpoint = %request.endpoint(), timeout_seconds, "Test run timed out")
            }
            TriggerOutcome::Errored { cause } => {
                error!(endpoint = %request.endpoint(), cause = %cause, "Test run trigger failed")
            }
        }
        log.println(&outcome.to_string());

        outcome
    }

    async fn await_outcome(&self, request: &TriggerRequest) -> TriggerOutcome {
        let now = Instant::now();
        let deadline = now
            .checked_add(request.timeout())
            .unwrap_or_else(|| now + FAR_FUTURE);
        let invoker = Arc::clone(&self.invoker);
        let endpoint = request.endpoint().to_string();
        let access_token = request.access_token().to_string();

        debug!(endpoint = %endpoint, timeout_secs = request.timeout_seconds(), "Dispatching trigger task");
        let mut worker = WorkerGuard(tokio::spawn(async move {
            invoker.invoke(&endpoint, &access_token).await
        }));

        // The deadline is polled first so that a result arriving exactly at
        // the deadline counts as timed out.
        tokio::select! {
            biased;
            _ = sleep_until(deadline) => TriggerOutcome::TimedOut {
                timeout_seconds: request.timeout_seconds(),
            },
            joined = &mut worker.0 => match joined {
                Ok(Ok(status)) => TriggerOutcome::from_status(status),
                Ok(Err(e)) => TriggerOutcome::Errored { cause: e.to_string() },
                Err(e) => TriggerOutcome::Errored {
                    cause: format!("Trigger task failed: {}", e),
                },
            },
        }
    }
}
