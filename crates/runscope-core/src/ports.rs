//! Port traits.
//!
//! These traits define the seams between the trigger core and the build host
//! that embeds it.

use crate::Result;
use crate::outcome::BuildResult;
use async_trait::async_trait;

/// Performs the outbound call that starts a remote test run.
#[async_trait]
pub trait TriggerInvoker: Send + Sync {
    /// Trigger the run at `endpoint` and return its normalized (lower-case) status.
    ///
    /// Makes a single attempt. Transport failures, unexpected responses and
    /// malformed payloads are returned as errors.
    async fn invoke(&self, endpoint: &str, access_token: &str) -> Result<String>;
}

/// Destination for the human-readable build log.
pub trait LogSink: Send + Sync {
    fn println(&self, line: &str);
}

/// Holder of the build step's final result.
pub trait BuildResultHolder: Send + Sync {
    /// Record the result. Returns `false` if a result was already recorded.
    fn set_result(&self, result: BuildResult) -> bool;

    fn result(&self) -> Option<BuildResult>;
}
