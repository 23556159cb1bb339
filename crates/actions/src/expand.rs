//! Inline JSON expansion of event payloads
//!
//! Some event sources deliver nested documents as JSON-encoded strings.
//! Actions configured with `expandInlineJSON` decode them before templating so
//! `${body.orderId}` can reach into `{"body": "{\"orderId\": 1}"}`.

use serde_json::Value;

/// Transforms a raw payload before parameter substitution
pub trait PayloadExpander: Send + Sync {
    fn expand(&self, payload: Value) -> Value;
}

/// Default [`PayloadExpander`] decoding embedded JSON objects and arrays
///
/// Inside maps and arrays, a string is decoded when its trimmed form starts
/// with `{` or `[` and parses. A top-level string is decoded whenever it
/// parses. Decoded values are not expanded again. Strings that fail to parse
/// are kept verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineJsonExpander;

impl InlineJsonExpander {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadExpander for InlineJsonExpander {
    fn expand(&self, payload: Value) -> Value {
        match payload {
            Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
            other => expand_nested(other),
        }
    }
}

fn expand_nested(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key, expand_nested(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(expand_nested).collect()),
        Value::String(s) if looks_like_json(&s) => {
            serde_json::from_str(&s).unwrap_or(Value::String(s))
        }
        other => other,
    }
}

fn looks_like_json(s: &str) -> bool {
    let trimmed = s.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}
