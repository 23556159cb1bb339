//! Engine-owned records that actions read and mutate
//!
//! Task and workflow instances are owned by the workflow engine. Actions only
//! read identity fields and write status, output and output message before
//! handing a task back to [`WorkflowEngine::update_task`](crate::engine::WorkflowEngine::update_task).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Working map produced by parameter substitution and returned to callers
pub type ResolvedMap = serde_json::Map<String, Value>;

/// Output key carrying the id of the message that triggered the action
pub const EVENT_MESSAGE_ID_KEY: &str = "conductor.event.messageId";

/// Output key carrying the name of the event that triggered the action
pub const EVENT_NAME_KEY: &str = "conductor.event.name";

/// Task status as tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Completed,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Whether the task has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "SCHEDULED"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// A single unit of work within a workflow instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    pub task_id: String,

    /// Task type, reported with action errors
    pub task_type: String,

    /// Reference name, suffixed with `__<n>` for loop iterations
    pub reference_task_name: String,

    pub workflow_instance_id: String,

    /// 0 for tasks outside a loop, 1..N for loop iterations
    #[serde(default)]
    pub iteration: u32,

    pub status: TaskStatus,

    #[serde(default)]
    pub output_data: serde_json::Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_message: Option<String>,
}

impl TaskInstance {
    /// Create a scheduled task with empty output
    pub fn new(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        reference_task_name: impl Into<String>,
        workflow_instance_id: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_type: task_type.into(),
            reference_task_name: reference_task_name.into(),
            workflow_instance_id: workflow_instance_id.into(),
            iteration: 0,
            status: TaskStatus::Scheduled,
            output_data: serde_json::Map::new(),
            output_message: None,
        }
    }

    /// Set the loop iteration
    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration;
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a single output field, replacing any previous value
    pub fn add_output(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.output_data.insert(key.into(), value.into());
    }
}

/// A running instance of a workflow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    pub workflow_id: String,

    pub workflow_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(default)]
    pub input: serde_json::Map<String, Value>,

    /// Tasks in scheduling order
    #[serde(default)]
    pub tasks: Vec<TaskInstance>,
}

impl WorkflowInstance {
    /// Create a workflow with no tasks
    pub fn new(workflow_id: impl Into<String>, workflow_name: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            workflow_name: workflow_name.into(),
            version: None,
            correlation_id: None,
            input: serde_json::Map::new(),
            tasks: Vec::new(),
        }
    }

    /// Append a task
    pub fn with_task(mut self, task: TaskInstance) -> Self {
        self.tasks.push(task);
        self
    }

    /// Find a task by its exact reference name
    ///
    /// A reference name scheduled more than once yields the most recent task.
    pub fn task_by_ref_name(&self, reference_task_name: &str) -> Option<&TaskInstance> {
        self.tasks
            .iter()
            .rev()
            .find(|t| t.reference_task_name == reference_task_name)
    }
}

/// Request handed to [`WorkflowEngine::start_workflow`](crate::engine::WorkflowEngine::start_workflow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    pub workflow_input: ResolvedMap,

    /// Name of the event that triggered the start
    pub event: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_to_domain: Option<HashMap<String, String>>,
}
