//! Target task resolution
//!
//! A task action names its target either directly by task id or by workflow
//! id plus reference name. Reference names inside loops carry an iteration
//! suffix, so a lookup by the logical name picks the latest iteration.

use tracing::debug;

use crate::engine::{EngineError, WorkflowEngine};
use crate::iteration::strip_iteration_suffix;
use crate::model::{TaskInstance, WorkflowInstance};

/// Result of resolving a target task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskLookup {
    Found(TaskInstance),
    NotFound(NotFound),
}

/// Why no target task was resolved
///
/// Identifiers that were not supplied are recorded as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// The workflow named by id does not exist
    WorkflowMissing { workflow_id: String },

    /// No task matched the identifiers
    TaskMissing {
        task_id: String,
        task_ref_name: String,
        workflow_id: String,
    },

    /// Neither a task id nor a workflow id with reference name was supplied
    NoIdentifiers {
        task_id: String,
        task_ref_name: String,
        workflow_id: String,
    },
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkflowMissing { workflow_id } => {
                write!(f, "No workflow found with ID: {workflow_id}")
            }
            Self::TaskMissing {
                task_id,
                task_ref_name,
                workflow_id,
            }
            | Self::NoIdentifiers {
                task_id,
                task_ref_name,
                workflow_id,
            } => write!(
                f,
                "No task found with taskId: {task_id}, reference name: {task_ref_name}, \
                 workflowId: {workflow_id}"
            ),
        }
    }
}

/// Resolves the task a complete/fail action targets
pub struct TaskResolver<'a, E: WorkflowEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: WorkflowEngine + ?Sized> TaskResolver<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Resolve at most one target task
    ///
    /// A non-empty `task_id` wins over the other identifiers. Engine failures
    /// are returned as errors; a missing target is `Ok(TaskLookup::NotFound)`.
    pub async fn resolve(
        &self,
        workflow_id: Option<&str>,
        task_id: Option<&str>,
        task_ref_name: Option<&str>,
    ) -> Result<TaskLookup, EngineError> {
        let workflow_id = workflow_id.filter(|s| !s.is_empty());
        let task_id = task_id.filter(|s| !s.is_empty());
        let task_ref_name = task_ref_name.filter(|s| !s.is_empty());

        let task_missing = || NotFound::TaskMissing {
            task_id: task_id.unwrap_or_default().to_string(),
            task_ref_name: task_ref_name.unwrap_or_default().to_string(),
            workflow_id: workflow_id.unwrap_or_default().to_string(),
        };

        if let Some(task_id) = task_id {
            debug!(task_id, "resolving task by id");
            return Ok(match self.engine.get_task(task_id).await? {
                Some(task) => TaskLookup::Found(task),
                None => TaskLookup::NotFound(task_missing()),
            });
        }

        let (Some(workflow_id), Some(task_ref_name)) = (workflow_id, task_ref_name) else {
            return Ok(TaskLookup::NotFound(NotFound::NoIdentifiers {
                task_id: String::new(),
                task_ref_name: task_ref_name.unwrap_or_default().to_string(),
                workflow_id: workflow_id.unwrap_or_default().to_string(),
            }));
        };

        debug!(workflow_id, task_ref_name, "resolving task by reference name");
        let Some(workflow) = self.engine.get_workflow(workflow_id, true).await? else {
            return Ok(TaskLookup::NotFound(NotFound::WorkflowMissing {
                workflow_id: workflow_id.to_string(),
            }));
        };

        Ok(match select_target(&workflow, task_ref_name) {
            Some(task) => TaskLookup::Found(task.clone()),
            None => TaskLookup::NotFound(task_missing()),
        })
    }
}

/// Pick the task a reference name denotes within a workflow
///
/// Tasks whose reference name equals `task_ref_name` once the iteration
/// suffix is stripped take precedence, highest iteration first. Otherwise the
/// latest exact match is used.
pub fn select_target<'w>(
    workflow: &'w WorkflowInstance,
    task_ref_name: &str,
) -> Option<&'w TaskInstance> {
    let exact = workflow.task_by_ref_name(task_ref_name);

    workflow
        .tasks
        .iter()
        .filter(|t| strip_iteration_suffix(&t.reference_task_name) == task_ref_name)
        .max_by_key(|t| t.iteration)
        .or(exact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InMemoryWorkflowEngine;
    use crate::iteration::append_iteration;

    fn looped_workflow(order: &[u32]) -> WorkflowInstance {
        let mut workflow = WorkflowInstance::new("wf-1", "poller")
            .with_task(TaskInstance::new("t-start", "SIMPLE", "start", "wf-1"));
        for &i in order {
            workflow = workflow.with_task(
                TaskInstance::new(format!("t-x{i}"), "WAIT", append_iteration("X", i), "wf-1")
                    .with_iteration(i),
            );
        }
        workflow
    }

    #[test]
    fn test_select_highest_iteration_any_order() {
        for order in [[1, 2, 3], [3, 1, 2], [2, 3, 1], [3, 2, 1]] {
            let workflow = looped_workflow(&order);
            let task = select_target(&workflow, "X").unwrap();
            assert_eq!(task.iteration, 3, "order {order:?}");
            assert_eq!(task.task_id, "t-x3");
        }
    }

    #[test]
    fn test_select_exact_match_without_loop() {
        let workflow = looped_workflow(&[1]);
        let task = select_target(&workflow, "start").unwrap();
        assert_eq!(task.task_id, "t-start");
    }

    #[test]
    fn test_select_suffixed_name_exactly() {
        let workflow = looped_workflow(&[1, 2]);
        let task = select_target(&workflow, "X__1").unwrap();
        assert_eq!(task.task_id, "t-x1");
    }

    #[test]
    fn test_select_none() {
        let workflow = looped_workflow(&[1, 2]);
        assert!(select_target(&workflow, "Y").is_none());
    }

    #[tokio::test]
    async fn test_resolve_by_task_id() {
        let engine = InMemoryWorkflowEngine::new();
        engine.add_workflow(looped_workflow(&[1, 2]));
        let resolver = TaskResolver::new(&engine);

        let lookup = resolver.resolve(Some("wf-1"), Some("t-x1"), Some("X")).await.unwrap();
        match lookup {
            TaskLookup::Found(task) => assert_eq!(task.task_id, "t-x1"),
            other => panic!("Expected Found, got {other:?}"),
        }

        let lookup = resolver.resolve(None, Some("t-nope"), None).await.unwrap();
        assert_eq!(
            lookup,
            TaskLookup::NotFound(NotFound::TaskMissing {
                task_id: "t-nope".to_string(),
                task_ref_name: String::new(),
                workflow_id: String::new(),
            })
        );
    }

    #[tokio::test]
    async fn test_resolve_by_reference_picks_latest_iteration() {
        let engine = InMemoryWorkflowEngine::new();
        engine.add_workflow(looped_workflow(&[2, 3, 1]));
        let resolver = TaskResolver::new(&engine);

        let lookup = resolver.resolve(Some("wf-1"), Some(""), Some("X")).await.unwrap();
        match lookup {
            TaskLookup::Found(task) => assert_eq!(task.iteration, 3),
            other => panic!("Expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_workflow() {
        let engine = InMemoryWorkflowEngine::new();
        let resolver = TaskResolver::new(&engine);

        let lookup = resolver.resolve(Some("wf-9"), None, Some("X")).await.unwrap();
        let TaskLookup::NotFound(not_found) = lookup else {
            panic!("Expected NotFound");
        };
        assert_eq!(not_found.to_string(), "No workflow found with ID: wf-9");
    }

    #[tokio::test]
    async fn test_resolve_without_identifiers() {
        let engine = InMemoryWorkflowEngine::new();
        let resolver = TaskResolver::new(&engine);

        let lookup = resolver.resolve(None, None, Some("X")).await.unwrap();
        let TaskLookup::NotFound(not_found) = lookup else {
            panic!("Expected NotFound");
        };
        assert!(matches!(not_found, NotFound::NoIdentifiers { .. }));
        assert_eq!(
            not_found.to_string(),
            "No task found with taskId: , reference name: X, workflowId: "
        );
    }
}
