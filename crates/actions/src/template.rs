//! Parameter substitution from event payloads
//!
//! Action configuration references payload values with `${expr}`:
//!
//! ```json
//! { "orderId": "${order.id}", "summary": "order ${order.id} by ${$.customer}" }
//! ```
//!
//! A string that is exactly one reference resolves to the referenced JSON
//! value (objects, numbers and nulls included). References embedded in longer
//! strings are interpolated as text. `$${` writes a literal `${`.
//!
//! Dotted paths of plain keys (`order.line-items.0`) are looked up directly in
//! the payload, so keys containing `-` work as written. Anything else is a
//! minijinja expression; `${order['line items']}` reaches other keys.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;

use crate::model::ResolvedMap;

/// Errors from parameter substitution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// The reference does not parse
    #[error("invalid expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    /// The reference parsed but could not be evaluated against the payload
    #[error("failed to evaluate '{expression}': {message}")]
    Evaluation { expression: String, message: String },

    /// The evaluated value could not be converted back to JSON
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Substitutes payload values into a template mapping
pub trait ParameterResolver: Send + Sync {
    /// Resolve every reference in `template` against `payload`
    fn replace(
        &self,
        template: &ResolvedMap,
        payload: &Value,
    ) -> Result<ResolvedMap, TemplateError>;
}

/// Default [`ParameterResolver`] evaluating `${expr}` references with minijinja
///
/// Expressions are minijinja expressions over the payload object, with an
/// optional JSONPath-style `$.` prefix. `${$}` is the whole payload. Missing
/// paths resolve to null.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionResolver {
    undefined: UndefinedBehavior,
}

impl ExpressionResolver {
    pub fn new() -> Self {
        Self {
            undefined: UndefinedBehavior::Chainable,
        }
    }

    /// Use strict undefined handling: a missing path is an evaluation error
    pub fn strict() -> Self {
        Self {
            undefined: UndefinedBehavior::Strict,
        }
    }
}

impl Default for ExpressionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterResolver for ExpressionResolver {
    fn replace(
        &self,
        template: &ResolvedMap,
        payload: &Value,
    ) -> Result<ResolvedMap, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(self.undefined);

        // Only object payloads expose named variables
        let ctx = match payload {
            Value::Object(_) => minijinja::Value::from_serialize(payload),
            _ => minijinja::Value::from_serialize(ResolvedMap::new()),
        };

        Substitution { env, ctx, payload }.resolve_map(template)
    }
}

/// One `replace` call; expressions borrow from the template being resolved
struct Substitution<'t> {
    env: Environment<'t>,
    ctx: minijinja::Value,
    payload: &'t Value,
}

impl<'t> Substitution<'t> {
    fn resolve_value(&self, value: &'t Value) -> Result<Value, TemplateError> {
        match value {
            Value::String(s) => self.resolve_string(s),
            Value::Array(items) => items
                .iter()
                .map(|v| self.resolve_value(v))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => self.resolve_map(map).map(Value::Object),
            _ => Ok(value.clone()),
        }
    }

    fn resolve_map(&self, map: &'t ResolvedMap) -> Result<ResolvedMap, TemplateError> {
        let mut resolved = ResolvedMap::new();
        for (key, value) in map {
            resolved.insert(key.clone(), self.resolve_value(value)?);
        }
        Ok(resolved)
    }

    fn resolve_string(&self, s: &'t str) -> Result<Value, TemplateError> {
        if let Some(expression) = pure_reference(s) {
            return self.evaluate(expression);
        }
        if !s.contains("${") {
            return Ok(Value::String(s.to_string()));
        }

        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(start) = rest.find("${") {
            if start > 0 && rest.as_bytes()[start - 1] == b'$' {
                out.push_str(&rest[..start - 1]);
                out.push_str("${");
                rest = &rest[start + 2..];
                continue;
            }
            let Some(len) = rest[start + 2..].find('}') else {
                break;
            };
            out.push_str(&rest[..start]);
            let value = self.evaluate(&rest[start + 2..start + 2 + len])?;
            push_text(&mut out, &value);
            rest = &rest[start + 3 + len..];
        }
        out.push_str(rest);
        Ok(Value::String(out))
    }

    fn evaluate(&self, expression: &'t str) -> Result<Value, TemplateError> {
        let expression = expression.trim();
        if expression == "$" {
            return Ok(self.payload.clone());
        }
        let path = expression.strip_prefix("$.").unwrap_or(expression);
        if path.is_empty() {
            return Err(TemplateError::InvalidExpression {
                expression: expression.to_string(),
                message: "empty reference".to_string(),
            });
        }
        if self.payload.is_object() {
            if let Some(value) = lookup_path(self.payload, path) {
                return Ok(value.clone());
            }
        }

        let compiled =
            self.env
                .compile_expression(path)
                .map_err(|e| TemplateError::InvalidExpression {
                    expression: expression.to_string(),
                    message: e.to_string(),
                })?;
        let value = compiled
            .eval(&self.ctx)
            .map_err(|e| TemplateError::Evaluation {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        if value.is_undefined() || value.is_none() {
            return Ok(Value::Null);
        }
        serde_json::to_value(&value).map_err(|e| TemplateError::Serialization(e.to_string()))
    }
}

/// The expression of a string that is exactly one `${...}` reference
fn pure_reference(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner)
}

/// Value at a dotted path of plain keys, if every segment is present
fn lookup_path<'v>(payload: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(payload, |value, segment| {
        let plain = !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if !plain {
            return None;
        }
        match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

fn push_text(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(value: Value) -> ResolvedMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("template must be an object"),
        }
    }

    #[test]
    fn test_pure_reference_keeps_json_type() {
        let resolver = ExpressionResolver::new();
        let payload = json!({"order": {"id": 42, "lines": [1, 2]}, "paid": true});

        let resolved = resolver
            .replace(
                &template(json!({
                    "id": "${order.id}",
                    "lines": "${$.order.lines}",
                    "paid": "${paid}",
                    "order": "${order}"
                })),
                &payload,
            )
            .unwrap();

        assert_eq!(resolved["id"], json!(42));
        assert_eq!(resolved["lines"], json!([1, 2]));
        assert_eq!(resolved["paid"], json!(true));
        assert_eq!(resolved["order"], json!({"id": 42, "lines": [1, 2]}));
    }

    #[test]
    fn test_missing_reference_is_null() {
        let resolver = ExpressionResolver::new();
        let resolved = resolver
            .replace(
                &template(json!({"a": "${missing}", "b": "${missing.deeper.still}"})),
                &json!({"present": 1}),
            )
            .unwrap();

        assert_eq!(resolved["a"], Value::Null);
        assert_eq!(resolved["b"], Value::Null);
    }

    #[test]
    fn test_embedded_references_interpolate() {
        let resolver = ExpressionResolver::new();
        let resolved = resolver
            .replace(
                &template(json!({"summary": "order ${order.id} for ${customer}${missing}"})),
                &json!({"order": {"id": 7}, "customer": "acme"}),
            )
            .unwrap();

        assert_eq!(resolved["summary"], json!("order 7 for acme"));
    }

    #[test]
    fn test_escaped_reference_is_literal() {
        let resolver = ExpressionResolver::new();
        let resolved = resolver
            .replace(
                &template(json!({"raw": "cost: $${price}", "mixed": "$${a} ${a}"})),
                &json!({"a": "x", "price": 3}),
            )
            .unwrap();

        assert_eq!(resolved["raw"], json!("cost: ${price}"));
        assert_eq!(resolved["mixed"], json!("${a} x"));
    }

    #[test]
    fn test_nested_structures_and_scalars() {
        let resolver = ExpressionResolver::new();
        let resolved = resolver
            .replace(
                &template(json!({
                    "nested": {"ids": ["${a}", "static", 3]},
                    "count": 5,
                    "flag": false,
                    "nothing": null
                })),
                &json!({"a": "A"}),
            )
            .unwrap();

        assert_eq!(resolved["nested"], json!({"ids": ["A", "static", 3]}));
        assert_eq!(resolved["count"], json!(5));
        assert_eq!(resolved["flag"], json!(false));
        assert_eq!(resolved["nothing"], Value::Null);
    }

    #[test]
    fn test_whole_payload_reference() {
        let resolver = ExpressionResolver::new();
        let resolved = resolver
            .replace(&template(json!({"all": "${$}"})), &json!(["x", "y"]))
            .unwrap();

        assert_eq!(resolved["all"], json!(["x", "y"]));
    }

    #[test]
    fn test_unterminated_reference_is_left_alone() {
        let resolver = ExpressionResolver::new();
        let resolved = resolver
            .replace(&template(json!({"s": "value ${oops"})), &json!({"oops": 1}))
            .unwrap();

        assert_eq!(resolved["s"], json!("value ${oops"));
    }

    #[test]
    fn test_hyphenated_keys_resolve() {
        let resolver = ExpressionResolver::new();
        let payload = json!({
            "order-id": 1,
            "order": {"line-items": [{"sku": "a-1"}]}
        });

        let resolved = resolver
            .replace(
                &template(json!({
                    "id": "${order-id}",
                    "sku": "${$.order.line-items.0.sku}",
                    "label": "order ${order-id}",
                    "quoted": "${order['line-items'][0].sku}"
                })),
                &payload,
            )
            .unwrap();

        assert_eq!(resolved["id"], json!(1));
        assert_eq!(resolved["sku"], json!("a-1"));
        assert_eq!(resolved["label"], json!("order 1"));
        assert_eq!(resolved["quoted"], json!("a-1"));
    }

    #[test]
    fn test_lookup_path() {
        let payload = json!({"a": {"b-c": [10, 20]}, "n": null});

        assert_eq!(lookup_path(&payload, "a.b-c.1"), Some(&json!(20)));
        assert_eq!(lookup_path(&payload, "n"), Some(&Value::Null));
        assert_eq!(lookup_path(&payload, "a.missing"), None);
        assert_eq!(lookup_path(&payload, "a.b-c.9"), None);
        assert_eq!(lookup_path(&payload, "a + 1"), None);
        assert_eq!(lookup_path(&payload, "a..b-c"), None);
    }

    #[test]
    fn test_strict_missing_reference_is_error() {
        let resolver = ExpressionResolver::strict();
        let err = resolver
            .replace(&template(json!({"a": "${missing.deeper}"})), &json!({"present": 1}))
            .unwrap_err();

        assert!(matches!(err, TemplateError::Evaluation { .. }));
    }

    #[test]
    fn test_invalid_expression() {
        let resolver = ExpressionResolver::new();
        let err = resolver
            .replace(&template(json!({"bad": "${a +}"})), &json!({"a": 1}))
            .unwrap_err();

        assert!(matches!(err, TemplateError::InvalidExpression { .. }));
    }
}
