//! # Event Actions
//!
//! Executes actions that inbound events trigger against a running workflow
//! engine: start a workflow, or complete/fail a task instance.
//!
//! ## Flow
//!
//! ```text
//! event payload ──► PayloadExpander (optional)
//!                        │
//! action config ──► ParameterResolver ──► resolved map
//!                        │
//!                        ▼
//!            TaskResolver / WorkflowEngine
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   ActionOutcome                  ActionError
//!   (Applied / TargetNotFound)     (hard failure)
//! ```
//!
//! A target that cannot be found is a soft failure: the returned map carries
//! an `error` field. Engine failures are raised after being reported to the
//! [`ActionMonitor`].
//!
//! ## Example
//!
//! ```ignore
//! use eventflow_actions::prelude::*;
//!
//! let engine = InMemoryWorkflowEngine::new();
//! let processor = ActionProcessor::new(engine);
//!
//! let action = Action::start_workflow(
//!     StartWorkflow::new("order_flow")
//!         .with_version(1)
//!         .with_input(input_template),
//! );
//! let outcome = processor
//!     .execute(&action, payload, "orders:created", "msg-1")
//!     .await?;
//! ```

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod expand;
pub mod iteration;
pub mod model;
pub mod monitor;
pub mod processor;
pub mod resolver;
pub mod telemetry;
pub mod template;

/// Prelude for common imports
pub mod prelude {
    pub use crate::action::{Action, ActionConfig, ActionKind, StartWorkflow, TaskDetails};
    pub use crate::config::ProcessorConfig;
    pub use crate::engine::{EngineError, InMemoryWorkflowEngine, WorkflowEngine};
    pub use crate::error::{ActionError, StartFailure};
    pub use crate::model::{ResolvedMap, TaskInstance, TaskStatus, WorkflowInstance};
    pub use crate::monitor::{ActionErrorCounter, ActionMonitor};
    pub use crate::processor::{ActionOutcome, ActionProcessor};
}

// Re-export key types at crate root
pub use action::{Action, ActionConfig, ActionConfigError, ActionKind, StartWorkflow, TaskDetails};
pub use config::ProcessorConfig;
pub use engine::{EngineError, EngineSnapshot, InMemoryWorkflowEngine, WorkflowEngine};
pub use error::{ActionError, Result, StartFailure};
pub use expand::{InlineJsonExpander, PayloadExpander};
pub use iteration::{append_iteration, strip_iteration_suffix};
pub use model::{
    ResolvedMap, StartWorkflowRequest, TaskInstance, TaskStatus, WorkflowInstance,
    EVENT_MESSAGE_ID_KEY, EVENT_NAME_KEY,
};
pub use monitor::{ActionErrorCounter, ActionMonitor, NoopMonitor};
pub use processor::{ActionOutcome, ActionProcessor};
pub use resolver::{NotFound, TaskLookup, TaskResolver};
pub use telemetry::{init_telemetry, TelemetryConfig};
pub use template::{ExpressionResolver, ParameterResolver, TemplateError};
