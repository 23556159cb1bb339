//! Start workflow handler

use serde_json::Value;
use tracing::{debug, error};

use super::{ActionOutcome, ActionProcessor, CORRELATION_ID_KEY, WORKFLOW_ID_KEY};
use crate::action::{Action, StartWorkflow};
use crate::engine::WorkflowEngine;
use crate::error::{ActionError, Result, StartFailure};
use crate::model::{ResolvedMap, StartWorkflowRequest, EVENT_MESSAGE_ID_KEY, EVENT_NAME_KEY};

impl<E: WorkflowEngine> ActionProcessor<E> {
    /// Start a workflow with templated input; returns `{workflowId}`
    pub(super) async fn start_workflow(
        &self,
        action: &Action,
        start: &StartWorkflow,
        payload: &Value,
        event: &str,
        message_id: &str,
    ) -> Result<ActionOutcome> {
        match self.try_start_workflow(start, payload, event, message_id).await {
            Ok(workflow_id) => {
                debug!(
                    workflow_name = %start.name,
                    version = ?start.version,
                    %workflow_id,
                    event,
                    message_id,
                    "started workflow"
                );
                let mut output = ResolvedMap::new();
                output.insert(WORKFLOW_ID_KEY.to_string(), Value::String(workflow_id));
                Ok(ActionOutcome::Applied(output))
            }
            Err(source) => {
                self.monitor
                    .record_action_error(action.name(), &start.name, event);
                error!(
                    workflow_name = %start.name,
                    version = ?start.version,
                    event,
                    message_id,
                    error = %source,
                    "error starting workflow"
                );
                Err(ActionError::StartWorkflow {
                    workflow_name: start.name.clone(),
                    source,
                })
            }
        }
    }

    async fn try_start_workflow(
        &self,
        start: &StartWorkflow,
        payload: &Value,
        event: &str,
        message_id: &str,
    ) -> std::result::Result<String, StartFailure> {
        let mut workflow_input = self.parameters.replace(&start.input, payload)?;

        let mut correlation = ResolvedMap::new();
        if let Some(correlation_id) = &start.correlation_id {
            correlation.insert(
                CORRELATION_ID_KEY.to_string(),
                Value::String(correlation_id.clone()),
            );
        }
        let correlation = self.parameters.replace(&correlation, payload)?;

        workflow_input.insert(
            EVENT_MESSAGE_ID_KEY.to_string(),
            Value::String(message_id.to_string()),
        );
        workflow_input.insert(EVENT_NAME_KEY.to_string(), Value::String(event.to_string()));

        let correlation_id = correlation
            .get(CORRELATION_ID_KEY)
            .and_then(text)
            .or_else(|| start.correlation_id.clone());

        let request = StartWorkflowRequest {
            name: start.name.clone(),
            version: start.version,
            correlation_id,
            workflow_input,
            event: event.to_string(),
            task_to_domain: start.task_to_domain.clone(),
        };

        Ok(self.engine.start_workflow(request).await?)
    }
}

/// Text form of a resolved value; null is absent
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
