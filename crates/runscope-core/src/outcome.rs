//! Trigger outcomes and the build result they map onto.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status string that counts as a passing remote run.
pub const TEST_RESULTS_PASS: &str = "pass";

/// Final state of the enclosing build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildResult {
    Success,
    Failure,
}

impl BuildResult {
    pub fn is_success(self) -> bool {
        matches!(self, BuildResult::Success)
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildResult::Success => write!(f, "success"),
            BuildResult::Failure => write!(f, "failure"),
        }
    }
}

/// Result of one bounded trigger invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// The remote run reported `pass`.
    Passed,
    /// The remote run reported any other status; the literal is kept.
    Failed { status: String },
    /// No result arrived before the deadline.
    TimedOut { timeout_seconds: u64 },
    /// The invocation failed before producing a status.
    Errored { cause: String },
}

impl TriggerOutcome {
    /// Classify a status reported by the remote run.
    ///
    /// Only `pass` is compared case-insensitively; everything else,
    /// including the empty string, is a failure.
    pub fn from_status(status: impl Into<String>) -> Self {
        let status = status.into();
        if status.eq_ignore_ascii_case(TEST_RESULTS_PASS) {
            TriggerOutcome::Passed
        } else {
            TriggerOutcome::Failed { status }
        }
    }

    pub fn build_result(&self) -> BuildResult {
        match self {
            TriggerOutcome::Passed => BuildResult::Success,
            _ => BuildResult::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.build_result().is_success()
    }
}

impl fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOutcome::Passed => write!(f, "Test Result:{}", TEST_RESULTS_PASS),
            TriggerOutcome::Failed { status } => write!(f, "Test Result:{}", status),
            TriggerOutcome::TimedOut { timeout_seconds } => write!(
                f,
                "Timeout Exception:no test result within {} seconds",
                timeout_seconds
            ),
            TriggerOutcome::Errored { cause } => write!(f, "Exception:{}", cause),
        }
    }
}
