//! Read access to tool call arguments.
//!
//! An argument counts as present when it exists, is not `null` and is not an
//! empty string. Declared parameter kinds drive how values are bound; they
//! are never used to reject a call.

use crate::models::{ParamKind, QueryParam, ToolDefinition};
use serde_json::Value as JsonValue;

/// JSON object carried by a `tools/call` request.
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Arguments of one invocation, viewed through its tool definition.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    tool: &'static ToolDefinition,
    values: &'a JsonObject,
}

impl<'a> Args<'a> {
    pub fn new(tool: &'static ToolDefinition, values: &'a JsonObject) -> Self {
        Self { tool, values }
    }

    fn present(&self, name: &str) -> Option<&'a JsonValue> {
        match self.values.get(name)? {
            JsonValue::Null => None,
            JsonValue::String(s) if s.is_empty() => None,
            value => Some(value),
        }
    }

    /// Bind value for `name`, coerced to the declared kind where possible.
    pub fn param(&self, name: &str) -> Option<QueryParam> {
        let value = self.present(name)?;
        let kind = self
            .tool
            .param(name)
            .map(|p| p.kind)
            .unwrap_or(ParamKind::String);
        Some(coerce(value, kind))
    }

    /// Argument rendered as text.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.present(name)? {
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Argument read as a number; numeric strings are accepted.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.present(name)? {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `limit` argument, or `default` when absent or not a number.
    pub fn limit(&self, default: i64) -> i64 {
        self.number("limit").map(|n| n as i64).unwrap_or(default)
    }
}

fn coerce(value: &JsonValue, kind: ParamKind) -> QueryParam {
    match (kind, value) {
        (ParamKind::Number, JsonValue::String(s)) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                QueryParam::Int(i)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                QueryParam::Float(f)
            } else {
                QueryParam::String(s.clone())
            }
        }
        (ParamKind::String, JsonValue::Number(n)) => QueryParam::String(n.to_string()),
        (ParamKind::String, JsonValue::Bool(b)) => QueryParam::String(b.to_string()),
        _ => QueryParam::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParamSpec;
    use serde_json::json;

    static TOOL: ToolDefinition = ToolDefinition {
        name: "t",
        description: "test",
        params: &[
            ParamSpec::number("id", "id"),
            ParamSpec::text("cnpj", "cnpj"),
            ParamSpec::number("limit", "limit"),
        ],
    };

    fn object(value: JsonValue) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_and_null_are_absent() {
        let values = object(json!({"cnpj": "", "id": null}));
        let args = Args::new(&TOOL, &values);
        assert!(args.param("cnpj").is_none());
        assert!(args.param("id").is_none());
        assert!(args.text("missing").is_none());
    }

    #[test]
    fn test_number_kind_coerces_numeric_strings() {
        let values = object(json!({"id": "42"}));
        let args = Args::new(&TOOL, &values);
        assert_eq!(args.param("id"), Some(QueryParam::Int(42)));
    }

    #[test]
    fn test_number_kind_keeps_unparseable_strings() {
        let values = object(json!({"id": "abc"}));
        let args = Args::new(&TOOL, &values);
        assert_eq!(args.param("id"), Some(QueryParam::from("abc")));
    }

    #[test]
    fn test_string_kind_stringifies_numbers() {
        let values = object(json!({"cnpj": 12345678000190u64}));
        let args = Args::new(&TOOL, &values);
        assert_eq!(args.param("cnpj"), Some(QueryParam::from("12345678000190")));
    }

    #[test]
    fn test_limit_default_and_override() {
        let empty = JsonObject::new();
        assert_eq!(Args::new(&TOOL, &empty).limit(50), 50);

        let values = object(json!({"limit": 5}));
        assert_eq!(Args::new(&TOOL, &values).limit(50), 5);

        let values = object(json!({"limit": "7"}));
        assert_eq!(Args::new(&TOOL, &values).limit(50), 7);
    }

    #[test]
    fn test_number_reads() {
        let values = object(json!({"latitude": -23.5, "longitude": "-46.6"}));
        let args = Args::new(&TOOL, &values);
        assert_eq!(args.number("latitude"), Some(-23.5));
        assert_eq!(args.number("longitude"), Some(-46.6));
    }
}
