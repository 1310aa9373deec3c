//! Runscope Trigger Core
//!
//! Domain types, traits, and error handling for the Runscope trigger build
//! step. This crate has minimal dependencies and defines the vocabulary
//! shared by the trigger engine and the command line.

pub mod config;
pub mod error;
pub mod interpolation;
pub mod outcome;
pub mod ports;
pub mod request;

pub use config::TriggerStepConfig;
pub use error::{Error, Result};
pub use interpolation::EnvExpander;
pub use outcome::{BuildResult, TriggerOutcome};
pub use ports::{BuildResultHolder, LogSink, TriggerInvoker};
pub use request::{DEFAULT_TIMEOUT_SECS, TriggerRequest};
