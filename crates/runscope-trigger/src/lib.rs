//! Bounded trigger-and-wait engine for Runscope test runs.
//!
//! Starts a remote test run, waits for its result up to a deadline and maps
//! the result onto the outcome of the enclosing build step.

pub mod invoker;
pub mod orchestrator;
pub mod sink;
pub mod step;

pub use invoker::{HttpTriggerInvoker, InvokerConfig, TriggeredRun};
pub use orchestrator::BoundedOrchestrator;
pub use sink::{BufferedLog, BuildStatus, LogEntry, TracingLog, WriterLog};
pub use step::{BuildStep, RunscopeStep, StepContext, StepDescriptor};
