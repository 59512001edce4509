//! Query-related data models.
//!
//! This module defines bound parameter values and the query plan handed to
//! the database gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

/// A row returned by the gateway, keyed by column name.
pub type Row = serde_json::Map<String, JsonValue>;

/// A parameter value for parameterized queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for QueryParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Convert a JSON argument into a bind value, keeping its JSON type.
///
/// Arrays and objects are bound as their JSON text.
impl From<&JsonValue> for QueryParam {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Self::String(s.clone()),
            other => Self::String(other.to_string()),
        }
    }
}

/// A statement with positional `$n` placeholders and its bound values.
///
/// Position `i` in `params` binds to placeholder `$(i + 1)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl QueryPlan {
    /// Create a plan with bound parameters.
    pub fn new(sql: impl Into<String>, params: Vec<QueryParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Create a plan that executes the text as-is, without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Number of distinct `$n` placeholders referenced by the statement.
    pub fn placeholder_count(&self) -> usize {
        let mut seen = BTreeSet::new();
        let mut chars = self.sql.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c != '$' {
                continue;
            }
            let mut digits = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            if let Ok(n) = digits.parse::<usize>() {
                seen.insert(n);
            }
        }
        seen.len()
    }

    /// Count of `AND` clauses appended to the statement.
    pub fn and_clause_count(&self) -> usize {
        self.sql.matches(" AND ").count()
    }
}
