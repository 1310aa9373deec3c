//! Build step adapter.
//!
//! Connects a user-facing [`TriggerStepConfig`] to the bounded orchestrator:
//! expands the endpoint against the build environment, builds the request and
//! records the outcome on the build.

use crate::invoker::{HttpTriggerInvoker, InvokerConfig};
use crate::orchestrator::BoundedOrchestrator;
use async_trait::async_trait;
use runscope_core::{
    BuildResultHolder, EnvExpander, Error, LogSink, Result, TriggerInvoker, TriggerOutcome,
    TriggerStepConfig,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DISPLAY_NAME: &str = "Runscope Test Configuration";

/// Metadata the build host shows for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
}

impl StepDescriptor {
    /// Steps of this kind can be added to any project.
    pub fn is_applicable(&self) -> bool {
        true
    }
}

/// Environment the step runs in.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub step_name: String,
    /// Build variables used to expand the endpoint.
    pub variables: HashMap<String, String>,
    /// Whether expansion falls back to the process environment.
    pub inherit_env: bool,
}

impl StepContext {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            variables: HashMap::new(),
            inherit_env: true,
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    fn expander(&self) -> EnvExpander {
        let expander = EnvExpander::with_variables(self.variables.clone());
        if self.inherit_env {
            expander
        } else {
            expander.isolated()
        }
    }
}

/// A step that a build host can execute.
#[async_trait]
pub trait BuildStep: Send + Sync {
    fn descriptor(&self) -> StepDescriptor;

    /// Execute the step.
    ///
    /// Returns `Err` only for faults in the step's own configuration or
    /// environment; a failing remote run is an `Ok` outcome with the build
    /// marked as failed.
    async fn perform(
        &self,
        ctx: &StepContext,
        log: &dyn LogSink,
        build: &dyn BuildResultHolder,
    ) -> Result<TriggerOutcome>;
}

/// Triggers a Runscope test run and fails the build unless it passes.
pub struct RunscopeStep {
    config: TriggerStepConfig,
    orchestrator: BoundedOrchestrator,
}

impl RunscopeStep {
    /// Create a step that talks to the configured Runscope API.
    pub fn new(config: TriggerStepConfig) -> Self {
        let invoker = HttpTriggerInvoker::new(InvokerConfig {
            api_url: config.api_url.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            ..Default::default()
        });
        Self::with_invoker(config, Arc::new(invoker))
    }

    /// Create a step with a custom invoker.
    pub fn with_invoker(config: TriggerStepConfig, invoker: Arc<dyn TriggerInvoker>) -> Self {
        Self {
            config,
            orchestrator: BoundedOrchestrator::new(invoker),
        }
    }

    pub fn config(&self) -> &TriggerStepConfig {
        &self.config
    }
}

#[async_trait]
impl BuildStep for RunscopeStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor {
            name: "runscope",
            display_name: DISPLAY_NAME,
        }
    }

    async fn perform(
        &self,
        ctx: &StepContext,
        log: &dyn LogSink,
        build: &dyn BuildResultHolder,
    ) -> Result<TriggerOutcome> {
        self.config.validate()?;

        let endpoint = ctx.expander().expand(&self.config.trigger_end_point);
        if endpoint.trim().is_empty() {
            return Err(Error::Config(format!(
                "trigger endpoint of step '{}' is empty after expansion",
                ctx.step_name
            )));
        }

        info!(step = %ctx.step_name, "Running Runscope trigger step");
        let request = self.config.to_request(endpoint);
        Ok(self.orchestrator.perform(&request, log, build).await)
    }
}
