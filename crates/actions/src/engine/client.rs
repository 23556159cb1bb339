//! WorkflowEngine trait definition

use async_trait::async_trait;

use crate::model::{StartWorkflowRequest, TaskInstance, WorkflowInstance};

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Task not found
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Workflow not found
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Engine or its storage is unreachable
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Operations on a running workflow engine
///
/// Lookups report absence as `Ok(None)`; an `Err` always means the engine call
/// itself failed. Implementations own persistence and concurrency control.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Get a task by id
    async fn get_task(&self, task_id: &str) -> Result<Option<TaskInstance>, EngineError>;

    /// Get a workflow, optionally with its tasks
    async fn get_workflow(
        &self,
        workflow_id: &str,
        include_tasks: bool,
    ) -> Result<Option<WorkflowInstance>, EngineError>;

    /// Persist a task's status, output and output message
    async fn update_task(&self, task: TaskInstance) -> Result<(), EngineError>;

    /// Start a workflow, returning the new workflow id
    async fn start_workflow(&self, request: StartWorkflowRequest) -> Result<String, EngineError>;
}
