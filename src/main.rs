//! Education DB MCP Server - Main entry point.
//!
//! Exposes the education platform PostgreSQL database to MCP clients as a
//! fixed catalog of query tools.

use clap::Parser;
use edu_db_mcp::config::{Config, TransportMode};
use edu_db_mcp::db::PgGateway;
use edu_db_mcp::error::DbResult;
use edu_db_mcp::logging::init_tracing;
use edu_db_mcp::tools::{Dispatcher, SelectGate};
use edu_db_mcp::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};

async fn serve(transport: impl Transport) -> DbResult<()> {
    info!(transport = transport.name(), "Transport starting");
    transport.run().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(&config.log_level, config.json_logs);

    info!(
        transport = %config.transport,
        "Starting Education DB MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let settings = config.database_settings();
    let gateway = match PgGateway::connect(&settings).await {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!(
                error = %e,
                suggestion = e.suggestion().unwrap_or_default(),
                "Database connection failed"
            );
            std::process::exit(1);
        }
    };

    let gate = SelectGate::from_strict(config.strict_select);
    if gate == SelectGate::Strict {
        info!("Strict SELECT checking enabled for freeform queries");
    }
    let dispatcher = Arc::new(Dispatcher::new(gateway).with_select_gate(gate));

    let result = match config.transport {
        TransportMode::Stdio => serve(StdioTransport::new(dispatcher)).await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            serve(HttpTransport::new(
                dispatcher,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            ))
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
