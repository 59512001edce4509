//! Configuration handling for the MCP server and the reverse proxy.
//!
//! Both binaries are configured via CLI arguments with environment variable
//! fallbacks. Database settings use the `PG_*` variables.

use clap::{Parser, ValueEnum};
use std::time::Duration;
use url::Url;

pub const DEFAULT_PG_HOST: &str = "localhost";
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 3001;
pub const DEFAULT_MCP_ENDPOINT: &str = "/api/mcp";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PROXY_HOST: &str = "127.0.0.1";
pub const DEFAULT_PROXY_PORT: u16 = 3002;
pub const DEFAULT_PROXY_UPSTREAM: &str = "http://localhost:3001";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Connection settings handed to the database gateway.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub connect_timeout: Duration,
    pub query_timeout: Duration,
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

/// Configuration for the MCP server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "edu-db-mcp",
    about = "MCP server exposing the education platform database as query tools",
    version,
    author
)]
pub struct Config {
    /// PostgreSQL host
    #[arg(long, default_value = DEFAULT_PG_HOST, env = "PG_HOST")]
    pub pg_host: String,

    /// PostgreSQL port
    #[arg(long, default_value_t = DEFAULT_PG_PORT, env = "PG_PORT")]
    pub pg_port: u16,

    /// PostgreSQL user
    #[arg(long, env = "PG_USER")]
    pub pg_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "PG_PASS", hide_env_values = true)]
    pub pg_pass: Option<String>,

    /// PostgreSQL database name
    #[arg(long, env = "PG_DATABASE")]
    pub pg_database: Option<String>,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "MCP_HTTP_PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Per-statement timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MCP_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Require freeform queries to parse as a single SELECT statement
    #[arg(long, env = "MCP_STRICT_SELECT")]
    pub strict_select: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Settings for the database gateway.
    pub fn database_settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            host: self.pg_host.clone(),
            port: self.pg_port,
            user: self.pg_user.clone(),
            password: self.pg_pass.clone(),
            database: self.pg_database.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            query_timeout: Duration::from_secs(self.query_timeout),
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

/// Configuration for the reverse proxy.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mcp-proxy",
    about = "Forwards every HTTP request to a single upstream MCP server",
    version
)]
pub struct ProxyConfig {
    /// Host to listen on
    #[arg(long, default_value = DEFAULT_PROXY_HOST, env = "PROXY_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PROXY_PORT, env = "PROXY_PORT")]
    pub port: u16,

    /// Upstream origin that receives all forwarded requests
    #[arg(long, default_value = DEFAULT_PROXY_UPSTREAM, env = "PROXY_UPSTREAM")]
    pub upstream: Url,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "PROXY_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "PROXY_JSON_LOGS")]
    pub json_logs: bool,
}

impl ProxyConfig {
    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::try_parse_from(["edu-db-mcp"]).unwrap();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.mcp_endpoint, DEFAULT_MCP_ENDPOINT);
        assert!(!config.strict_select);
    }

    #[test]
    fn test_database_settings_from_args() {
        let config = Config::try_parse_from([
            "edu-db-mcp",
            "--pg-host",
            "db.internal",
            "--pg-port",
            "6543",
            "--pg-user",
            "reader",
            "--pg-pass",
            "secret",
            "--pg-database",
            "escolas",
            "--query-timeout",
            "5",
        ])
        .unwrap();

        let settings = config.database_settings();
        assert_eq!(settings.host, "db.internal");
        assert_eq!(settings.port, 6543);
        assert_eq!(settings.user.as_deref(), Some("reader"));
        assert_eq!(settings.database.as_deref(), Some("escolas"));
        assert_eq!(settings.query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_database_settings_debug_hides_password() {
        let config =
            Config::try_parse_from(["edu-db-mcp", "--pg-pass", "hunter2"]).unwrap();
        let debug = format!("{:?}", config.database_settings());
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_http_transport_args() {
        let config = Config::try_parse_from([
            "edu-db-mcp",
            "--transport",
            "http",
            "--http-port",
            "8080",
        ])
        .unwrap();
        assert_eq!(config.transport, TransportMode::Http);
        assert_eq!(config.http_bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_proxy_config_defaults() {
        let config = ProxyConfig::try_parse_from(["mcp-proxy"]).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:3002");
        assert_eq!(config.upstream.as_str(), "http://localhost:3001/");
    }

    #[test]
    fn test_proxy_config_rejects_bad_upstream() {
        let result = ProxyConfig::try_parse_from(["mcp-proxy", "--upstream", "not a url"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_transport_mode_display() {
        assert_eq!(TransportMode::Stdio.to_string(), "stdio");
        assert_eq!(TransportMode::Http.to_string(), "http");
    }
}
