//! A single, validated trigger invocation.

use serde::Serialize;
use std::time::Duration;

/// Timeout used when none is configured or a negative value is supplied.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const MASK: &str = "***";

/// Everything the orchestrator needs for one invocation.
///
/// The endpoint is expected to be fully expanded. The timeout is always
/// non-negative: negative inputs fall back to [`DEFAULT_TIMEOUT_SECS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerRequest {
    endpoint: String,
    #[serde(skip_serializing)]
    access_token: String,
    timeout_seconds: u64,
    mask_access_token: bool,
}

impl TriggerRequest {
    /// Create a request, normalizing a negative timeout to the default.
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>, timeout: i64) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            timeout_seconds: normalize_timeout(timeout),
            mask_access_token: true,
        }
    }

    /// Replace the timeout. Negative values are normalized just like in [`TriggerRequest::new`].
    pub fn with_timeout(mut self, timeout: i64) -> Self {
        self.timeout_seconds = normalize_timeout(timeout);
        self
    }

    /// Whether the configuration echo shows the token or a mask.
    pub fn with_masked_token(mut self, masked: bool) -> Self {
        self.mask_access_token = masked;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn masks_access_token(&self) -> bool {
        self.mask_access_token
    }

    /// The token as it should appear in the build log.
    pub fn display_token(&self) -> &str {
        if self.mask_access_token && !self.access_token.is_empty() {
            MASK
        } else {
            &self.access_token
        }
    }
}

/// Map a configured timeout onto the value the orchestrator uses.
///
/// Zero is kept as-is; only negative values are replaced.
pub fn normalize_timeout(timeout: i64) -> u64 {
    u64::try_from(timeout).unwrap_or(DEFAULT_TIMEOUT_SECS)
}
