//! Action dispatch
//!
//! The `ActionProcessor` is responsible for:
//! - Expanding inline JSON in the payload when the action asks for it
//! - Routing each action kind to its handler
//! - Reporting soft failures as [`ActionOutcome::TargetNotFound`] and hard
//!   failures as [`ActionError`]

mod start;
mod task;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::action::{Action, ActionConfig, ActionConfigError, ActionKind};
use crate::config::ProcessorConfig;
use crate::engine::WorkflowEngine;
use crate::error::{ActionError, Result};
use crate::expand::{InlineJsonExpander, PayloadExpander};
use crate::model::{ResolvedMap, TaskStatus};
use crate::monitor::{ActionMonitor, NoopMonitor};
use crate::template::{ExpressionResolver, ParameterResolver};

/// Key of the workflow id in resolved maps
pub const WORKFLOW_ID_KEY: &str = "workflowId";
/// Key of the task id in resolved maps
pub const TASK_ID_KEY: &str = "taskId";
/// Key of the task reference name in resolved maps
pub const TASK_REF_NAME_KEY: &str = "taskRefName";
/// Key of the correlation id resolved for workflow starts
pub const CORRELATION_ID_KEY: &str = "correlationId";
/// Key carrying the soft or hard failure message in resolved maps
pub const ERROR_KEY: &str = "error";

/// Result of an action that did not raise
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The engine call succeeded
    Applied(ResolvedMap),

    /// The target task or workflow does not exist; the map carries `error`
    TargetNotFound(ResolvedMap),
}

impl ActionOutcome {
    /// The output map, whichever the outcome
    pub fn output(&self) -> &ResolvedMap {
        match self {
            Self::Applied(output) | Self::TargetNotFound(output) => output,
        }
    }

    pub fn into_output(self) -> ResolvedMap {
        match self {
            Self::Applied(output) | Self::TargetNotFound(output) => output,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The `error` field of the output, if set
    pub fn error(&self) -> Option<&str> {
        self.output().get(ERROR_KEY).and_then(Value::as_str)
    }
}

/// Executes actions against a workflow engine
///
/// Stateless between calls: one processor can serve concurrent events.
///
/// # Example
///
/// ```ignore
/// use eventflow_actions::prelude::*;
///
/// let processor = ActionProcessor::new(InMemoryWorkflowEngine::new());
/// let action = Action::complete_task(TaskDetails::by_task_id("${taskId}"));
/// let outcome = processor
///     .execute(&action, json!({"taskId": "t-1"}), "orders:paid", "msg-1")
///     .await?;
/// ```
pub struct ActionProcessor<E: WorkflowEngine> {
    engine: Arc<E>,
    parameters: Arc<dyn ParameterResolver>,
    expander: Arc<dyn PayloadExpander>,
    monitor: Arc<dyn ActionMonitor>,
    config: ProcessorConfig,
}

impl<E: WorkflowEngine> ActionProcessor<E> {
    /// Create a processor with the default collaborators
    pub fn new(engine: E) -> Self {
        Self::with_engine(Arc::new(engine))
    }

    /// Create a processor sharing an engine handle
    pub fn with_engine(engine: Arc<E>) -> Self {
        Self {
            engine,
            parameters: Arc::new(ExpressionResolver::new()),
            expander: Arc::new(InlineJsonExpander::new()),
            monitor: Arc::new(NoopMonitor),
            config: ProcessorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_parameter_resolver(mut self, parameters: Arc<dyn ParameterResolver>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_expander(mut self, expander: Arc<dyn PayloadExpander>) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn ActionMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// The engine actions are executed against
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Execute an action for an event
    ///
    /// Returns [`ActionOutcome::TargetNotFound`] when a task action cannot
    /// locate its target. Engine failures and template errors are raised.
    pub async fn execute(
        &self,
        action: &Action,
        payload: Value,
        event: &str,
        message_id: &str,
    ) -> Result<ActionOutcome> {
        debug!(action = action.name(), event, message_id, "executing action");

        let payload = if action.expand_inline_json {
            self.expander.expand(payload)
        } else {
            payload
        };

        match &action.kind {
            ActionKind::StartWorkflow(start) => {
                self.start_workflow(action, start, &payload, event, message_id)
                    .await
            }
            ActionKind::CompleteTask(details) => {
                self.update_task_status(
                    action,
                    details,
                    TaskStatus::Completed,
                    &payload,
                    event,
                    message_id,
                )
                .await
            }
            ActionKind::FailTask(details) => {
                self.update_task_status(
                    action,
                    details,
                    TaskStatus::Failed,
                    &payload,
                    event,
                    message_id,
                )
                .await
            }
        }
    }

    /// Execute an action given in its upstream wire form
    ///
    /// Unknown action kinds fail with [`ActionError::UnsupportedAction`]
    /// before any engine call.
    pub async fn execute_config(
        &self,
        config: &ActionConfig,
        payload: Value,
        event: &str,
        message_id: &str,
    ) -> Result<ActionOutcome> {
        let action = config
            .clone()
            .into_action(self.config.expand_inline_json_default)
            .map_err(|e| match e {
                ActionConfigError::Unsupported(action) => ActionError::UnsupportedAction {
                    action,
                    event: event.to_string(),
                },
                other => ActionError::InvalidAction {
                    event: event.to_string(),
                    source: other,
                },
            })?;

        self.execute(&action, payload, event, message_id).await
    }
}
