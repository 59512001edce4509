//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - The gateway owning the single PostgreSQL connection
//! - Parameter binding
//! - Row to JSON type mappings

pub mod gateway;
pub mod params;
pub mod types;

pub use gateway::{Gateway, PgGateway};
pub use types::RowToJson;
