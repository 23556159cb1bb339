//! In-memory implementation of WorkflowEngine for tests and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::client::{EngineError, WorkflowEngine};
use crate::model::{StartWorkflowRequest, TaskInstance, WorkflowInstance};

/// Serializable state of an [`InMemoryWorkflowEngine`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    #[serde(default)]
    pub workflows: Vec<WorkflowInstance>,
}

/// In-memory implementation of WorkflowEngine
///
/// Holds workflows and their tasks in maps and applies updates immediately.
/// Every start request is kept so callers can inspect what the engine received.
///
/// # Example
///
/// ```
/// use eventflow_actions::{InMemoryWorkflowEngine, TaskInstance, WorkflowInstance};
///
/// let engine = InMemoryWorkflowEngine::new();
/// engine.add_workflow(
///     WorkflowInstance::new("wf-1", "order_flow")
///         .with_task(TaskInstance::new("t-1", "WAIT", "approve", "wf-1")),
/// );
/// assert_eq!(engine.workflow_count(), 1);
/// ```
pub struct InMemoryWorkflowEngine {
    workflows: RwLock<HashMap<String, WorkflowInstance>>,
    /// task id -> owning workflow id
    task_index: RwLock<HashMap<String, String>>,
    started: RwLock<Vec<StartWorkflowRequest>>,
}

impl InMemoryWorkflowEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            workflows: RwLock::new(HashMap::new()),
            task_index: RwLock::new(HashMap::new()),
            started: RwLock::new(Vec::new()),
        }
    }

    /// Create an engine holding the workflows of a snapshot
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Self {
        let engine = Self::new();
        for workflow in snapshot.workflows {
            engine.add_workflow(workflow);
        }
        engine
    }

    /// Capture the current workflows, ordered by id
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut workflows: Vec<WorkflowInstance> =
            self.workflows.read().values().cloned().collect();
        workflows.sort_by(|a, b| a.workflow_id.cmp(&b.workflow_id));
        EngineSnapshot { workflows }
    }

    /// Insert or replace a workflow and index its tasks
    pub fn add_workflow(&self, workflow: WorkflowInstance) {
        let mut index = self.task_index.write();
        for task in &workflow.tasks {
            index.insert(task.task_id.clone(), workflow.workflow_id.clone());
        }
        self.workflows
            .write()
            .insert(workflow.workflow_id.clone(), workflow);
    }

    /// Get the number of workflows
    pub fn workflow_count(&self) -> usize {
        self.workflows.read().len()
    }

    /// Start requests received so far, oldest first
    pub fn started_requests(&self) -> Vec<StartWorkflowRequest> {
        self.started.read().clone()
    }
}

impl Default for InMemoryWorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowEngine for InMemoryWorkflowEngine {
    async fn get_task(&self, task_id: &str) -> Result<Option<TaskInstance>, EngineError> {
        let Some(workflow_id) = self.task_index.read().get(task_id).cloned() else {
            return Ok(None);
        };
        let workflows = self.workflows.read();
        Ok(workflows
            .get(&workflow_id)
            .and_then(|w| w.tasks.iter().find(|t| t.task_id == task_id))
            .cloned())
    }

    async fn get_workflow(
        &self,
        workflow_id: &str,
        include_tasks: bool,
    ) -> Result<Option<WorkflowInstance>, EngineError> {
        let workflows = self.workflows.read();
        Ok(workflows.get(workflow_id).map(|w| {
            let mut workflow = w.clone();
            if !include_tasks {
                workflow.tasks.clear();
            }
            workflow
        }))
    }

    async fn update_task(&self, task: TaskInstance) -> Result<(), EngineError> {
        let workflow_id = self
            .task_index
            .read()
            .get(&task.task_id)
            .cloned()
            .ok_or_else(|| EngineError::TaskNotFound(task.task_id.clone()))?;

        let mut workflows = self.workflows.write();
        let workflow = workflows
            .get_mut(&workflow_id)
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.clone()))?;
        let slot = workflow
            .tasks
            .iter_mut()
            .find(|t| t.task_id == task.task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task.task_id.clone()))?;

        *slot = task;
        Ok(())
    }

    async fn start_workflow(&self, request: StartWorkflowRequest) -> Result<String, EngineError> {
        let workflow_id = Uuid::now_v7().to_string();

        let workflow = WorkflowInstance {
            workflow_id: workflow_id.clone(),
            workflow_name: request.name.clone(),
            version: request.version,
            correlation_id: request.correlation_id.clone(),
            input: request.workflow_input.clone(),
            tasks: Vec::new(),
        };

        self.workflows.write().insert(workflow_id.clone(), workflow);
        self.started.write().push(request);
        Ok(workflow_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use serde_json::json;

    fn order_workflow() -> WorkflowInstance {
        WorkflowInstance::new("wf-1", "order_flow")
            .with_task(TaskInstance::new("t-1", "SIMPLE", "reserve", "wf-1"))
            .with_task(TaskInstance::new("t-2", "WAIT", "approve", "wf-1"))
    }

    #[tokio::test]
    async fn test_get_task_and_workflow() {
        let engine = InMemoryWorkflowEngine::new();
        engine.add_workflow(order_workflow());

        let task = engine.get_task("t-2").await.unwrap().unwrap();
        assert_eq!(task.reference_task_name, "approve");
        assert!(engine.get_task("t-9").await.unwrap().is_none());

        let with_tasks = engine.get_workflow("wf-1", true).await.unwrap().unwrap();
        assert_eq!(with_tasks.tasks.len(), 2);

        let without_tasks = engine.get_workflow("wf-1", false).await.unwrap().unwrap();
        assert!(without_tasks.tasks.is_empty());

        assert!(engine.get_workflow("wf-9", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_task_persists() {
        let engine = InMemoryWorkflowEngine::new();
        engine.add_workflow(order_workflow());

        let mut task = engine.get_task("t-2").await.unwrap().unwrap();
        task.status = TaskStatus::Completed;
        task.add_output("approved", true);
        engine.update_task(task).await.unwrap();

        let stored = engine.get_task("t-2").await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert_eq!(stored.output_data["approved"], json!(true));
    }

    #[tokio::test]
    async fn test_update_unknown_task_fails() {
        let engine = InMemoryWorkflowEngine::new();
        let task = TaskInstance::new("t-404", "SIMPLE", "ghost", "wf-404");

        let err = engine.update_task(task).await.unwrap_err();
        assert_eq!(err, EngineError::TaskNotFound("t-404".to_string()));
    }

    #[tokio::test]
    async fn test_start_workflow_records_request() {
        let engine = InMemoryWorkflowEngine::new();
        let mut input = serde_json::Map::new();
        input.insert("orderId".to_string(), json!("o-1"));

        let request = StartWorkflowRequest {
            name: "order_flow".to_string(),
            version: Some(1),
            correlation_id: Some("corr-1".to_string()),
            workflow_input: input,
            event: "orders:created".to_string(),
            task_to_domain: None,
        };

        let workflow_id = engine.start_workflow(request.clone()).await.unwrap();
        let workflow = engine.get_workflow(&workflow_id, true).await.unwrap().unwrap();

        assert_eq!(workflow.workflow_name, "order_flow");
        assert_eq!(workflow.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(workflow.input["orderId"], json!("o-1"));
        assert_eq!(engine.started_requests(), vec![request]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let engine = InMemoryWorkflowEngine::from_snapshot(EngineSnapshot {
            workflows: vec![order_workflow(), WorkflowInstance::new("wf-0", "refund_flow")],
        });

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.workflows.len(), 2);
        assert_eq!(snapshot.workflows[0].workflow_id, "wf-0");
        assert_eq!(snapshot.workflows[1].tasks.len(), 2);
    }
}
