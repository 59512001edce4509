//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout.

use crate::db::Gateway;
use crate::error::{DbError, DbResult};
use crate::mcp::CatalogService;
use crate::tools::Dispatcher;
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::{info, warn};

pub struct StdioTransport<G> {
    dispatcher: Arc<Dispatcher<G>>,
}

impl<G: Gateway> StdioTransport<G> {
    pub fn new(dispatcher: Arc<Dispatcher<G>>) -> Self {
        Self { dispatcher }
    }
}

impl<G: Gateway> Transport for StdioTransport<G> {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = CatalogService::new(self.dispatcher.clone());
        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => info!("Stdio transport completed normally"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.dispatcher.gateway().close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        self.dispatcher.gateway().close().await;

        if shutdown_requested {
            // A pending stdin read cannot be interrupted by select!.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QueryPlan, Row};

    struct NoopGateway;

    impl Gateway for NoopGateway {
        async fn fetch_all(&self, _plan: &QueryPlan) -> DbResult<Vec<Row>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_stdio_transport_creation() {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(NoopGateway)));
        let transport = StdioTransport::new(dispatcher);
        assert_eq!(transport.name(), "stdio");
    }
}
