//! Complete and fail task handler

use serde_json::Value;
use tracing::{debug, error};

use super::{
    ActionOutcome, ActionProcessor, ERROR_KEY, TASK_ID_KEY, TASK_REF_NAME_KEY, WORKFLOW_ID_KEY,
};
use crate::action::{Action, TaskDetails};
use crate::engine::WorkflowEngine;
use crate::error::{ActionError, Result};
use crate::model::{ResolvedMap, TaskStatus, EVENT_MESSAGE_ID_KEY, EVENT_NAME_KEY};
use crate::resolver::{TaskLookup, TaskResolver};

impl<E: WorkflowEngine> ActionProcessor<E> {
    /// Move the target task to `status` with the resolved map as its output
    pub(super) async fn update_task_status(
        &self,
        action: &Action,
        details: &TaskDetails,
        status: TaskStatus,
        payload: &Value,
        event: &str,
        message_id: &str,
    ) -> Result<ActionOutcome> {
        let mut resolved = self.parameters.replace(&seed_map(details), payload)?;

        // Identity comes from the resolved map: templates may compute it
        let workflow_id = identity(&resolved, WORKFLOW_ID_KEY);
        let task_id = identity(&resolved, TASK_ID_KEY);
        let task_ref_name = identity(&resolved, TASK_REF_NAME_KEY);

        let lookup = TaskResolver::new(self.engine.as_ref())
            .resolve(
                workflow_id.as_deref(),
                task_id.as_deref(),
                task_ref_name.as_deref(),
            )
            .await?;

        let mut task = match lookup {
            TaskLookup::Found(task) => task,
            TaskLookup::NotFound(not_found) => {
                debug!(
                    action = action.name(),
                    event,
                    message_id,
                    reason = %not_found,
                    "no target task for action"
                );
                resolved.insert(ERROR_KEY.to_string(), Value::String(not_found.to_string()));
                return Ok(ActionOutcome::TargetNotFound(resolved));
            }
        };

        task.status = status;
        task.output_data = resolved;
        task.output_message = details.output_message.clone();
        task.add_output(EVENT_MESSAGE_ID_KEY, message_id);
        task.add_output(EVENT_NAME_KEY, event);

        let output = task.output_data.clone();
        let target_task_id = task.task_id.clone();
        let task_type = task.task_type.clone();
        let target_workflow_id = task.workflow_instance_id.clone();

        match self.engine.update_task(task).await {
            Ok(()) => {
                debug!(
                    task_id = %target_task_id,
                    workflow_id = %target_workflow_id,
                    %status,
                    event,
                    message_id,
                    "updated task"
                );
                Ok(ActionOutcome::Applied(output))
            }
            Err(e) => {
                self.monitor
                    .record_action_error(action.name(), &task_type, event);
                error!(
                    task_ref_name = task_ref_name.as_deref().unwrap_or_default(),
                    task_id = %target_task_id,
                    workflow_id = %target_workflow_id,
                    action = action.name(),
                    event,
                    message_id,
                    error = %e,
                    "error updating task"
                );

                let mut output = output;
                if self.config.annotate_update_failures {
                    output.insert(ERROR_KEY.to_string(), Value::String(e.to_string()));
                }
                Err(ActionError::TaskUpdate {
                    task_id: target_task_id,
                    output,
                    source: e,
                })
            }
        }
    }
}

/// Identity fields first, then static output fields that do not collide with them
fn seed_map(details: &TaskDetails) -> ResolvedMap {
    let mut seed = ResolvedMap::new();
    let fields = [
        (WORKFLOW_ID_KEY, &details.workflow_id),
        (TASK_ID_KEY, &details.task_id),
        (TASK_REF_NAME_KEY, &details.task_ref_name),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            seed.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    for (key, value) in &details.output {
        seed.entry(key.clone()).or_insert_with(|| value.clone());
    }
    seed
}

/// Textual identity value; non-scalar values count as absent
fn identity(resolved: &ResolvedMap, key: &str) -> Option<String> {
    match resolved.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
