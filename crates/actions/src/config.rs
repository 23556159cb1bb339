// Processor configuration
//
// Loaded from environment variables, with defaults matching the behavior of
// actions configured upstream without these options.

use std::env;

/// Configuration for [`ActionProcessor`](crate::ActionProcessor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Expansion applied when an action config leaves `expandInlineJSON` unset
    pub expand_inline_json_default: bool,

    /// Whether a failed task update carries the output annotated with `error`
    pub annotate_update_failures: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            expand_inline_json_default: false,
            annotate_update_failures: true,
        }
    }
}

impl ProcessorConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `EVENTFLOW_EXPAND_INLINE_JSON`: default for `expandInlineJSON` (default: false)
    /// - `EVENTFLOW_ANNOTATE_UPDATE_FAILURES`: annotate failed task updates (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expand_inline_json_default: env_flag(
                "EVENTFLOW_EXPAND_INLINE_JSON",
                defaults.expand_inline_json_default,
            ),
            annotate_update_failures: env_flag(
                "EVENTFLOW_ANNOTATE_UPDATE_FAILURES",
                defaults.annotate_update_failures,
            ),
        }
    }

    pub fn with_expand_inline_json_default(mut self, expand: bool) -> Self {
        self.expand_inline_json_default = expand;
        self
    }

    pub fn with_annotate_update_failures(mut self, annotate: bool) -> Self {
        self.annotate_update_failures = annotate;
        self
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
