//! Tool catalog and dispatch.
//!
//! - `catalog`: static tool definitions
//! - `args`: argument access and coercion
//! - `builder`: parameterized statement construction
//! - `plans`: per-tool query plans
//! - `sql_validator`: gate for freeform statements
//! - `format`: response envelopes
//! - `dispatch`: name to plan to gateway to envelope

pub mod args;
pub mod builder;
pub mod catalog;
pub mod dispatch;
pub mod format;
pub mod plans;
pub mod sql_validator;

pub use args::{Args, JsonObject};
pub use builder::{FilterOp, Limit, QueryBuilder};
pub use catalog::{catalog, find_tool};
pub use dispatch::Dispatcher;
pub use format::ToolOutput;
pub use sql_validator::SelectGate;
