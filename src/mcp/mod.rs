//! MCP server integration module.
//!
//! Connects the rmcp protocol handler to the tool dispatcher.

pub mod service;

pub use service::CatalogService;
