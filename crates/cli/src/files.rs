// Document loading for action, payload, and state files
//
// `.yaml`/`.yml` files are read as YAML; everything else as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read and deserialize a JSON or YAML document
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = if is_yaml(path) {
        serde_yaml::from_str(&raw).with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

/// Serialize a document in the format its extension names
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = if is_yaml(path) {
        serde_yaml::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventflow_actions::{ActionConfig, EngineSnapshot, TaskInstance, WorkflowInstance};
    use serde_json::{json, Value};

    #[test]
    fn test_load_yaml_action() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("action.yaml");
        std::fs::write(
            &path,
            "action: complete_task\ncomplete_task:\n  taskId: \"${taskId}\"\n",
        )
        .unwrap();

        let config: ActionConfig = load_document(&path).unwrap();
        assert_eq!(config.action, "complete_task");
        assert!(config.complete_task.is_some());
    }

    #[test]
    fn test_load_json_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"taskId": "t-1"}"#).unwrap();

        let payload: Value = load_document(&path).unwrap();
        assert_eq!(payload, json!({"taskId": "t-1"}));
    }

    #[test]
    fn test_invalid_document_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_document::<Value>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_snapshot_survives_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.yml");
        let snapshot = EngineSnapshot {
            workflows: vec![WorkflowInstance::new("wf-1", "order_flow")
                .with_task(TaskInstance::new("t-1", "WAIT", "approve", "wf-1"))],
        };

        write_document(&path, &snapshot).unwrap();
        let loaded: EngineSnapshot = load_document(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }
}
