//! Reverse proxy in front of the MCP HTTP transport.

use clap::Parser;
use edu_db_mcp::config::ProxyConfig;
use edu_db_mcp::logging::init_tracing;
use edu_db_mcp::proxy;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProxyConfig::parse();
    init_tracing(&config.log_level, config.json_logs);

    if let Err(e) = proxy::run(&config).await {
        error!(error = %e, "Proxy error");
        return Err(e.into());
    }
    Ok(())
}
