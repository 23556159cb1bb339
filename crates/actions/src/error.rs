// Error types for action execution
//
// Only hard failures live here. A target that cannot be found is a soft
// failure and is returned as ActionOutcome::TargetNotFound instead.

use thiserror::Error;

use crate::action::ActionConfigError;
use crate::engine::EngineError;
use crate::model::ResolvedMap;
use crate::template::TemplateError;

/// Result type alias for action execution
pub type Result<T> = std::result::Result<T, ActionError>;

/// Hard failures raised by the action processor
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action kind is not one the processor knows
    #[error("action not supported: {action} for event {event}")]
    UnsupportedAction { action: String, event: String },

    /// The action names a known kind but its configuration is unusable
    #[error("invalid action for event {event}: {source}")]
    InvalidAction {
        event: String,
        #[source]
        source: ActionConfigError,
    },

    /// Parameter substitution failed
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Looking up the target task or workflow failed
    #[error("engine lookup failed: {0}")]
    Lookup(#[from] EngineError),

    /// The engine rejected the task update
    ///
    /// `output` is the resolved map as it stood when the update failed,
    /// annotated with `error` unless annotation is disabled.
    #[error("failed to update task {task_id}: {source}")]
    TaskUpdate {
        task_id: String,
        output: ResolvedMap,
        #[source]
        source: EngineError,
    },

    /// Starting the workflow failed
    #[error("failed to start workflow {workflow_name}: {source}")]
    StartWorkflow {
        workflow_name: String,
        #[source]
        source: StartFailure,
    },
}

/// Cause of a failed workflow start
#[derive(Debug, Error)]
pub enum StartFailure {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ActionError {
    /// The engine failure behind this error, if any
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Lookup(e) | Self::TaskUpdate { source: e, .. } => Some(e),
            Self::StartWorkflow {
                source: StartFailure::Engine(e),
                ..
            } => Some(e),
            _ => None,
        }
    }

    /// The partially built output attached to the failure, if any
    pub fn output(&self) -> Option<&ResolvedMap> {
        match self {
            Self::TaskUpdate { output, .. } => Some(output),
            _ => None,
        }
    }
}
