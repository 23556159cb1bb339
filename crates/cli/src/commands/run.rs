// Run command: execute one action against an engine snapshot

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use eventflow_actions::{
    ActionConfig, ActionError, ActionErrorCounter, ActionOutcome, ActionProcessor, EngineSnapshot,
    InMemoryWorkflowEngine, ProcessorConfig, ResolvedMap,
};
use serde::Serialize;
use serde_json::Value;

use crate::files::{load_document, write_document};
use crate::output::{field_text, print_field, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Action file (JSON or YAML)
    #[arg(long, short)]
    pub action: PathBuf,

    /// Event payload file (JSON or YAML); empty object when omitted
    #[arg(long, short)]
    pub payload: Option<PathBuf>,

    /// Event name
    #[arg(long, short)]
    pub event: String,

    /// Message id; generated when omitted
    #[arg(long)]
    pub message_id: Option<String>,

    /// Engine snapshot to run against
    #[arg(long, short, env = "EVENTFLOW_STATE")]
    pub state: Option<PathBuf>,

    /// Write the engine state back to the snapshot file after the run
    #[arg(long, requires = "state")]
    pub save: bool,

    /// Expand JSON-encoded strings in the payload unless the action says otherwise
    #[arg(long)]
    pub expand_inline_json: bool,
}

/// Result of one run, as printed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    action: String,
    event: String,
    message_id: String,
    status: &'static str,
    output: ResolvedMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: RunArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config: ActionConfig = load_document(&args.action)?;
    let payload: Value = match &args.payload {
        Some(path) => load_document(path)?,
        None => Value::Object(Default::default()),
    };
    let snapshot: EngineSnapshot = match &args.state {
        Some(path) => load_document(path)?,
        None => EngineSnapshot::default(),
    };
    let message_id = args
        .message_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());

    let mut processor_config = ProcessorConfig::from_env();
    if args.expand_inline_json {
        processor_config = processor_config.with_expand_inline_json_default(true);
    }

    let engine = Arc::new(InMemoryWorkflowEngine::from_snapshot(snapshot));
    let monitor = Arc::new(ActionErrorCounter::new());
    let processor = ActionProcessor::with_engine(engine.clone())
        .with_config(processor_config)
        .with_monitor(monitor.clone());

    let result = processor
        .execute_config(&config, payload, &args.event, &message_id)
        .await;

    let report = report(&config, &args.event, &message_id, &result);
    print_report(&report, format, quiet)?;

    if args.save {
        if let Some(path) = &args.state {
            write_document(path, &engine.snapshot())
                .with_context(|| format!("failed to save state to {}", path.display()))?;
        }
    }

    tracing::debug!(errors = monitor.total(), "run finished");

    result.map(|_| ()).context("action failed")
}

fn report(
    config: &ActionConfig,
    event: &str,
    message_id: &str,
    result: &std::result::Result<ActionOutcome, ActionError>,
) -> RunReport {
    let (status, output, error) = match result {
        Ok(ActionOutcome::Applied(output)) => ("applied", output.clone(), None),
        Ok(ActionOutcome::TargetNotFound(output)) => (
            "target_not_found",
            output.clone(),
            output.get("error").map(field_text),
        ),
        Err(e) => (
            "failed",
            e.output().cloned().unwrap_or_default(),
            Some(e.to_string()),
        ),
    };

    RunReport {
        action: config.action.clone(),
        event: event.to_string(),
        message_id: message_id.to_string(),
        status,
        output,
        error,
    }
}

fn print_report(report: &RunReport, format: OutputFormat, quiet: bool) -> Result<()> {
    if !format.is_text() {
        return format.print_value(report);
    }

    if quiet {
        println!("{}", report.status);
        return Ok(());
    }

    print_field("Action", &report.action);
    print_field("Event", &report.event);
    print_field("Message ID", &report.message_id);
    print_field("Status", report.status);
    if let Some(error) = &report.error {
        print_field("Error", error);
    }
    if !report.output.is_empty() {
        println!("\nOutput:");
        for (key, value) in &report.output {
            println!("  {:<30} {}", key, field_text(value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventflow_actions::{ActionConfigError, EngineError};
    use serde_json::json;

    fn config(action: &str) -> ActionConfig {
        ActionConfig {
            action: action.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_report_applied() {
        let mut output = ResolvedMap::new();
        output.insert("workflowId".to_string(), json!("wf-9"));
        let result = Ok(ActionOutcome::Applied(output));

        let report = report(&config("start_workflow"), "orders:created", "m-1", &result);
        assert_eq!(report.status, "applied");
        assert_eq!(report.output["workflowId"], json!("wf-9"));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_report_target_not_found_carries_error() {
        let mut output = ResolvedMap::new();
        output.insert("error".to_string(), json!("No workflow found with ID: wf-x"));
        let result = Ok(ActionOutcome::TargetNotFound(output));

        let report = report(&config("complete_task"), "orders:paid", "m-2", &result);
        assert_eq!(report.status, "target_not_found");
        assert_eq!(report.error.as_deref(), Some("No workflow found with ID: wf-x"));
    }

    #[test]
    fn test_report_failure_includes_task_output() {
        let mut output = ResolvedMap::new();
        output.insert("approved".to_string(), json!(true));
        let result = Err(ActionError::TaskUpdate {
            task_id: "t-1".to_string(),
            output,
            source: EngineError::Unavailable("down".to_string()),
        });

        let report = report(&config("complete_task"), "orders:paid", "m-3", &result);
        assert_eq!(report.status, "failed");
        assert_eq!(report.output["approved"], json!(true));
        assert!(report.error.is_some());
    }

    #[test]
    fn test_report_invalid_action_has_empty_output() {
        let result = Err(ActionError::InvalidAction {
            event: "orders:paid".to_string(),
            source: ActionConfigError::MissingSection("complete_task"),
        });

        let report = report(&config("complete_task"), "orders:paid", "m-4", &result);
        assert_eq!(report.status, "failed");
        assert!(report.output.is_empty());
    }
}
