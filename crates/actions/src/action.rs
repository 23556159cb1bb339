//! Action configuration
//!
//! [`ActionConfig`] is the upstream wire form: a free-form `action` name plus one
//! optional section per kind. [`Action`] is the validated form the processor
//! dispatches on, where the kind and its configuration travel together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ResolvedMap;

/// Wire name of the start workflow action
pub const START_WORKFLOW: &str = "start_workflow";
/// Wire name of the complete task action
pub const COMPLETE_TASK: &str = "complete_task";
/// Wire name of the fail task action
pub const FAIL_TASK: &str = "fail_task";

/// Error converting an [`ActionConfig`] into an [`Action`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionConfigError {
    /// The action name is not one of the known kinds
    #[error("action not supported: {0}")]
    Unsupported(String),

    /// The section for the named kind is missing
    #[error("action {0} has no configuration section")]
    MissingSection(&'static str),
}

/// A validated action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,

    /// Decode JSON documents embedded as strings in the payload before templating
    #[serde(default)]
    pub expand_inline_json: bool,
}

impl Action {
    /// Create an action that uses the payload as-is
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            expand_inline_json: false,
        }
    }

    /// Start a workflow
    pub fn start_workflow(start: StartWorkflow) -> Self {
        Self::new(ActionKind::StartWorkflow(start))
    }

    /// Mark a task completed
    pub fn complete_task(details: TaskDetails) -> Self {
        Self::new(ActionKind::CompleteTask(details))
    }

    /// Mark a task failed
    pub fn fail_task(details: TaskDetails) -> Self {
        Self::new(ActionKind::FailTask(details))
    }

    /// Enable inline JSON expansion of the payload
    pub fn with_expand_inline_json(mut self, expand: bool) -> Self {
        self.expand_inline_json = expand;
        self
    }

    /// Wire name of the action kind
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// The supported action kinds with their configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    StartWorkflow(StartWorkflow),
    CompleteTask(TaskDetails),
    FailTask(TaskDetails),
}

impl ActionKind {
    /// Wire name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartWorkflow(_) => START_WORKFLOW,
            Self::CompleteTask(_) => COMPLETE_TASK,
            Self::FailTask(_) => FAIL_TASK,
        }
    }
}

/// Identifies the task a complete/fail action targets and the output to write
///
/// Every identity field may hold a `${...}` reference into the event payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref_name: Option<String>,

    /// Static output merged under the identity fields before templating
    #[serde(default)]
    pub output: ResolvedMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_message: Option<String>,
}

impl TaskDetails {
    /// Target a task directly by id
    pub fn by_task_id(task_id: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            ..Default::default()
        }
    }

    /// Target a task by workflow id and reference name
    pub fn by_reference(workflow_id: impl Into<String>, task_ref_name: impl Into<String>) -> Self {
        Self {
            workflow_id: Some(workflow_id.into()),
            task_ref_name: Some(task_ref_name.into()),
            ..Default::default()
        }
    }

    /// Set the static output
    pub fn with_output(mut self, output: ResolvedMap) -> Self {
        self.output = output;
        self
    }

    /// Set the output message
    pub fn with_output_message(mut self, message: impl Into<String>) -> Self {
        self.output_message = Some(message.into());
        self
    }
}

/// Parameters for starting a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflow {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Static correlation id; may itself be a `${...}` reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(default)]
    pub input: ResolvedMap,

    /// Passed to the engine unresolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_to_domain: Option<HashMap<String, String>>,
}

impl StartWorkflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            correlation_id: None,
            input: ResolvedMap::new(),
            task_to_domain: None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_input(mut self, input: ResolvedMap) -> Self {
        self.input = input;
        self
    }

    pub fn with_task_to_domain(mut self, task_to_domain: HashMap<String, String>) -> Self {
        self.task_to_domain = Some(task_to_domain);
        self
    }
}

/// Upstream action configuration, as stored alongside event handlers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_workflow: Option<StartWorkflow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_task: Option<TaskDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_task: Option<TaskDetails>,

    /// Unset means "use the processor default"
    #[serde(
        rename = "expandInlineJSON",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expand_inline_json: Option<bool>,
}

impl ActionConfig {
    /// Convert into an [`Action`], using `expand_default` when the config leaves expansion unset
    pub fn into_action(self, expand_default: bool) -> Result<Action, ActionConfigError> {
        let expand_inline_json = self.expand_inline_json.unwrap_or(expand_default);
        let kind = match self.action.as_str() {
            START_WORKFLOW => ActionKind::StartWorkflow(
                self.start_workflow
                    .ok_or(ActionConfigError::MissingSection(START_WORKFLOW))?,
            ),
            COMPLETE_TASK => ActionKind::CompleteTask(
                self.complete_task
                    .ok_or(ActionConfigError::MissingSection(COMPLETE_TASK))?,
            ),
            FAIL_TASK => ActionKind::FailTask(
                self.fail_task
                    .ok_or(ActionConfigError::MissingSection(FAIL_TASK))?,
            ),
            other => return Err(ActionConfigError::Unsupported(other.to_string())),
        };

        Ok(Action {
            kind,
            expand_inline_json,
        })
    }
}

impl TryFrom<ActionConfig> for Action {
    type Error = ActionConfigError;

    fn try_from(config: ActionConfig) -> Result<Self, Self::Error> {
        config.into_action(false)
    }
}

impl From<Action> for ActionConfig {
    fn from(action: Action) -> Self {
        let mut config = ActionConfig {
            action: action.name().to_string(),
            expand_inline_json: Some(action.expand_inline_json),
            ..Default::default()
        };
        match action.kind {
            ActionKind::StartWorkflow(start) => config.start_workflow = Some(start),
            ActionKind::CompleteTask(details) => config.complete_task = Some(details),
            ActionKind::FailTask(details) => config.fail_task = Some(details),
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_complete_task_config() {
        let config: ActionConfig = serde_json::from_value(json!({
            "action": "complete_task",
            "complete_task": {
                "workflowId": "${workflowId}",
                "taskRefName": "wait_for_approval",
                "output": {"approved": "${approved}"}
            },
            "expandInlineJSON": true
        }))
        .unwrap();

        let action = Action::try_from(config).unwrap();
        assert!(action.expand_inline_json);
        assert_eq!(action.name(), COMPLETE_TASK);

        match action.kind {
            ActionKind::CompleteTask(details) => {
                assert_eq!(details.workflow_id.as_deref(), Some("${workflowId}"));
                assert_eq!(details.task_ref_name.as_deref(), Some("wait_for_approval"));
                assert!(details.task_id.is_none());
                assert_eq!(details.output["approved"], json!("${approved}"));
            }
            _ => panic!("Expected CompleteTask"),
        }
    }

    #[test]
    fn test_unknown_action_is_unsupported() {
        let config = ActionConfig {
            action: "archive_workflow".to_string(),
            ..Default::default()
        };

        let err = Action::try_from(config).unwrap_err();
        assert_eq!(
            err,
            ActionConfigError::Unsupported("archive_workflow".to_string())
        );
    }

    #[test]
    fn test_missing_section() {
        let config = ActionConfig {
            action: FAIL_TASK.to_string(),
            complete_task: Some(TaskDetails::by_task_id("t-1")),
            ..Default::default()
        };

        let err = Action::try_from(config).unwrap_err();
        assert_eq!(err, ActionConfigError::MissingSection(FAIL_TASK));
    }

    #[test]
    fn test_expand_default_applies_when_unset() {
        let config = ActionConfig {
            action: START_WORKFLOW.to_string(),
            start_workflow: Some(StartWorkflow::new("order_flow")),
            ..Default::default()
        };

        let action = config.into_action(true).unwrap();
        assert!(action.expand_inline_json);
    }

    #[test]
    fn test_action_to_config() {
        let action = Action::start_workflow(StartWorkflow::new("order_flow").with_version(2));
        let config = ActionConfig::from(action);

        assert_eq!(config.action, START_WORKFLOW);
        assert_eq!(config.expand_inline_json, Some(false));
        assert_eq!(config.start_workflow.unwrap().version, Some(2));
        assert!(config.complete_task.is_none());
    }
}
