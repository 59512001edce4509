//! Data models for the MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod query;
pub mod tool;

// Re-export commonly used types
pub use query::{QueryParam, QueryPlan, Row};
pub use tool::{ParamDefault, ParamKind, ParamSpec, ToolDefinition};
