//! Education DB MCP Server Library
//!
//! Maps MCP tool calls onto parameterized PostgreSQL queries over a single
//! connection, plus a small reverse proxy for the HTTP transport.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod proxy;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, ToolError};
pub use mcp::CatalogService;
