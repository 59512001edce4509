//! Gate for caller-supplied statements.
//!
//! The default gate is a prefix check: after trimming and uppercasing, the
//! text must start with `SELECT`. It does not stop a second statement after
//! a semicolon or a data-modifying CTE and is not a security boundary.
//!
//! Strict mode additionally parses the text with
//! [sqlparser](https://docs.rs/sqlparser/) using the PostgreSQL dialect and
//! requires exactly one query statement.

use crate::error::{ToolError, ToolResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

/// How much checking freeform text receives before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectGate {
    /// Prefix check only.
    #[default]
    Prefix,
    /// Prefix check plus a single-`SELECT` parse.
    Strict,
}

impl SelectGate {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Prefix }
    }

    /// Accept or reject `sql`. Accepted text is executed verbatim.
    pub fn check(&self, sql: &str) -> ToolResult<()> {
        if !has_select_prefix(sql) {
            return Err(ToolError::RejectedQuery);
        }
        match self {
            Self::Prefix => Ok(()),
            Self::Strict => check_single_query(sql),
        }
    }
}

/// Whether the trimmed, uppercased text starts with `SELECT`.
pub fn has_select_prefix(sql: &str) -> bool {
    sql.trim().to_uppercase().starts_with("SELECT")
}

fn check_single_query(sql: &str) -> ToolResult<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql).map_err(|e| {
        debug!(error = %e, "Freeform query failed to parse");
        ToolError::RejectedQuery
    })?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        other => {
            debug!(statements = other.len(), "Freeform query is not a single SELECT");
            Err(ToolError::RejectedQuery)
        }
    }
}
