// Resolve command: show which task an action would target

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use eventflow_actions::{EngineSnapshot, InMemoryWorkflowEngine, TaskLookup, TaskResolver};
use serde_json::json;

use crate::files::load_document;
use crate::output::{print_field, OutputFormat};

#[derive(Args)]
pub struct ResolveArgs {
    /// Engine snapshot to search
    #[arg(long, short, env = "EVENTFLOW_STATE")]
    pub state: PathBuf,

    /// Workflow instance id
    #[arg(long, short)]
    pub workflow_id: Option<String>,

    /// Task id; takes precedence over the reference name
    #[arg(long, short)]
    pub task_id: Option<String>,

    /// Task reference name, with or without an iteration suffix
    #[arg(long, short = 'r')]
    pub task_ref_name: Option<String>,
}

pub async fn run(args: ResolveArgs, format: OutputFormat) -> Result<()> {
    let snapshot: EngineSnapshot = load_document(&args.state)?;
    let engine = InMemoryWorkflowEngine::from_snapshot(snapshot);

    let lookup = TaskResolver::new(&engine)
        .resolve(
            args.workflow_id.as_deref(),
            args.task_id.as_deref(),
            args.task_ref_name.as_deref(),
        )
        .await?;

    match lookup {
        TaskLookup::Found(task) => {
            if format.is_text() {
                print_field("Task ID", &task.task_id);
                print_field("Reference", &task.reference_task_name);
                print_field("Iteration", &task.iteration.to_string());
                print_field("Type", &task.task_type);
                print_field("Status", &task.status.to_string());
                print_field("Workflow ID", &task.workflow_instance_id);
                Ok(())
            } else {
                format.print_value(&task)
            }
        }
        TaskLookup::NotFound(not_found) => {
            if format.is_text() {
                print_field("Error", &not_found.to_string());
                Ok(())
            } else {
                format.print_value(&json!({ "error": not_found.to_string() }))
            }
        }
    }
}
