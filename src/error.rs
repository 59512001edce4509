//! Error types for the MCP server.
//!
//! [`DbError`] covers the database gateway and process-level failures.
//! [`ToolError`] covers everything a single tool call can fail with; it is
//! converted into an error envelope at the dispatcher boundary and never
//! escapes as a protocol fault.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u32,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u32) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// SQLSTATE code reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }

    /// The driver-facing message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Connection { message, .. }
            | Self::Database { message, .. }
            | Self::Internal { message } => message.clone(),
            Self::Timeout { .. } => self.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the PG_* connection settings and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection is closed", "Restart the server")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Failure of a single tool call.
///
/// Display strings are the user-facing text placed in the error envelope.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("must supply {}", .alternatives.join(" or "))]
    MissingIdentifier { alternatives: Vec<&'static str> },

    #[error("only SELECT queries are permitted")]
    RejectedQuery,

    #[error("invalid grouping column: {value} (allowed: {})", .allowed.join(", "))]
    InvalidGrouping {
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("database error: {}", .0.message())]
    Execution(#[from] DbError),
}

impl ToolError {
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    pub fn missing_identifier(alternatives: &[&'static str]) -> Self {
        Self::MissingIdentifier {
            alternatives: alternatives.to_vec(),
        }
    }

    pub fn invalid_grouping(value: impl Into<String>, allowed: &[&'static str]) -> Self {
        Self::InvalidGrouping {
            value: value.into(),
            allowed: allowed.to_vec(),
        }
    }

    /// SQLSTATE of the underlying database error, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution(err) => err.sql_state(),
            _ => None,
        }
    }

    /// Whether this failure came from the database rather than the caller.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

/// Result type alias for tool calls.
pub type ToolResult<T> = Result<T, ToolError>;
