//! Action error reporting
//!
//! Hard failures are reported to an [`ActionMonitor`] before they propagate.
//! Monitors are fire-and-forget: they never change how an action completes.

use dashmap::DashMap;

/// Receives action error events
pub trait ActionMonitor: Send + Sync {
    /// Record a failed engine call for an action
    ///
    /// `entity_type` is the task type for task actions and the workflow name
    /// for start workflow actions.
    fn record_action_error(&self, action: &str, entity_type: &str, event: &str);
}

/// Monitor that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl ActionMonitor for NoopMonitor {
    fn record_action_error(&self, _action: &str, _entity_type: &str, _event: &str) {}
}

/// Key of an [`ActionErrorCounter`] entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionErrorKey {
    pub action: String,
    pub entity_type: String,
    pub event: String,
}

/// Monitor counting errors per (action, entity type, event)
///
/// Each record is also logged at warn level.
#[derive(Debug, Default)]
pub struct ActionErrorCounter {
    counts: DashMap<ActionErrorKey, u64>,
}

impl ActionErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors recorded for one key
    pub fn count(&self, action: &str, entity_type: &str, event: &str) -> u64 {
        let key = ActionErrorKey {
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            event: event.to_string(),
        };
        self.counts.get(&key).map(|c| *c).unwrap_or(0)
    }

    /// Errors recorded across all keys
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }

    /// Copy of all counters
    pub fn snapshot(&self) -> Vec<(ActionErrorKey, u64)> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl ActionMonitor for ActionErrorCounter {
    fn record_action_error(&self, action: &str, entity_type: &str, event: &str) {
        tracing::warn!(action, entity_type, event, "event action error");
        let key = ActionErrorKey {
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            event: event.to_string(),
        };
        *self.counts.entry(key).or_insert(0) += 1;
    }
}
