//! Response envelope rendering.
//!
//! Every tool call, successful or not, ends up as a single text content
//! block. Row sets and objects are pretty-printed JSON.

use crate::error::ToolError;
use crate::models::Row;
use rmcp::model::{CallToolResult, Content};
use serde_json::Value as JsonValue;

/// Text returned by lookups that matched no row.
pub const NOT_FOUND: &str = "not found";

/// Successful outcome of a tool call, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Every returned row, as a JSON array.
    Rows(Vec<Row>),
    /// A single JSON object.
    Object(Row),
    /// Lookup with zero rows.
    NotFound,
    /// Plain text.
    Text(String),
}

impl ToolOutput {
    /// First row as an object, or [`ToolOutput::NotFound`].
    pub fn first_row(rows: Vec<Row>) -> Self {
        rows.into_iter()
            .next()
            .map(Self::Object)
            .unwrap_or(Self::NotFound)
    }

    /// Text placed in the envelope.
    pub fn render(&self) -> String {
        match self {
            Self::Rows(rows) => pretty(rows),
            Self::Object(row) => pretty(row),
            Self::NotFound => NOT_FOUND.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    pub fn into_result(self) -> CallToolResult {
        CallToolResult::success(vec![Content::text(self.render())])
    }
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Error envelope carrying the human-readable message.
pub fn error_result(err: &ToolError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}

/// Read an integer column, treating `null` or a missing column as zero.
pub fn int_or_zero(row: Option<&Row>, column: &str) -> i64 {
    match row.and_then(|r| r.get(column)) {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(JsonValue::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: JsonValue) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_rows_render_as_pretty_array() {
        let output = ToolOutput::Rows(vec![row(json!({"id": 1}))]);
        assert_eq!(output.render(), "[\n  {\n    \"id\": 1\n  }\n]");
    }

    #[test]
    fn test_rows_keep_column_order() {
        let mut selected = Row::new();
        selected.insert("status".into(), json!("ativo"));
        selected.insert("id".into(), json!(7));
        selected.insert("cnpj".into(), json!("123"));
        let rendered = ToolOutput::Object(selected).render();

        let status = rendered.find("\"status\"").unwrap();
        let id = rendered.find("\"id\"").unwrap();
        let cnpj = rendered.find("\"cnpj\"").unwrap();
        assert!(status < id && id < cnpj, "{}", rendered);
    }

    #[test]
    fn test_empty_rows_render_as_empty_array() {
        assert_eq!(ToolOutput::Rows(Vec::new()).render(), "[]");
    }

    #[test]
    fn test_first_row() {
        assert_eq!(ToolOutput::first_row(Vec::new()), ToolOutput::NotFound);
        let output = ToolOutput::first_row(vec![row(json!({"id": 1})), row(json!({"id": 2}))]);
        assert_eq!(output, ToolOutput::Object(row(json!({"id": 1}))));
    }

    #[test]
    fn test_not_found_is_success() {
        let result = ToolOutput::NotFound.into_result();
        assert_ne!(result.is_error, Some(true));
    }

    #[test]
    fn test_error_result_flags_error() {
        let result = error_result(&ToolError::RejectedQuery);
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn test_int_or_zero() {
        let r = row(json!({"a": 3, "b": null, "c": "12"}));
        assert_eq!(int_or_zero(Some(&r), "a"), 3);
        assert_eq!(int_or_zero(Some(&r), "b"), 0);
        assert_eq!(int_or_zero(Some(&r), "c"), 12);
        assert_eq!(int_or_zero(Some(&r), "missing"), 0);
        assert_eq!(int_or_zero(None, "a"), 0);
    }
}
