//! Tool catalog data models.
//!
//! A [`ToolDefinition`] is immutable, statically declared data describing one
//! callable tool and its input parameters. The declared `required` and `kind`
//! fields are advertised to clients but are not enforced before execution.

use rmcp::model::Tool;
use serde_json::{Map, Value as JsonValue, json};
use std::sync::Arc;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

/// Default value advertised for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Int(i64),
    Float(f64),
}

impl ParamDefault {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Int(v) => json!(v),
            Self::Float(v) => json!(v),
        }
    }
}

/// One declared input parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamDefault>,
    /// Allowed values for string parameters; empty means unrestricted.
    pub allowed: &'static [&'static str],
    pub description: &'static str,
}

impl ParamSpec {
    /// Optional string parameter.
    pub const fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            required: false,
            default: None,
            allowed: &[],
            description,
        }
    }

    /// Optional number parameter.
    pub const fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            required: false,
            default: None,
            allowed: &[],
            description,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, default: ParamDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    /// JSON Schema fragment for this parameter.
    pub fn schema(&self) -> JsonValue {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.kind.as_str()));
        prop.insert("description".into(), json!(self.description));
        if let Some(default) = self.default {
            prop.insert("default".into(), default.to_json());
        }
        if !self.allowed.is_empty() {
            prop.insert("enum".into(), json!(self.allowed));
        }
        JsonValue::Object(prop)
    }
}

/// A named, schema-described operation.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// Parameters in declaration order.
    pub params: &'static [ParamSpec],
}

impl ToolDefinition {
    /// Look up a declared parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Render the input schema as a JSON Schema object.
    pub fn input_schema(&self) -> Map<String, JsonValue> {
        let properties: Map<String, JsonValue> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), JsonValue::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }

    /// Convert into the MCP tool descriptor advertised by `tools/list`.
    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, Arc::new(self.input_schema()))
    }
}
