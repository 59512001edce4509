//! HTTP transport with Streamable HTTP support for the MCP server.

use crate::db::Gateway;
use crate::error::{DbError, DbResult};
use crate::mcp::CatalogService;
use crate::tools::Dispatcher;
use crate::transport::{Transport, wait_for_signal};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// SSE sessions can keep the server alive; give up waiting after this long.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport<G> {
    dispatcher: Arc<Dispatcher<G>>,
    host: String,
    port: u16,
    /// MCP endpoint path
    endpoint: String,
}

impl<G: Gateway> HttpTransport<G> {
    pub fn new(
        dispatcher: Arc<Dispatcher<G>>,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the MCP endpoint path.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn router(&self) -> axum::Router {
        let dispatcher = self.dispatcher.clone();
        let service = StreamableHttpService::new(
            move || Ok(CatalogService::new(dispatcher.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects "/"
        if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        }
    }
}

impl<G: Gateway> Transport for HttpTransport<G> {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting MCP server with HTTP transport on {}", bind_addr);

        let app = self.router();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        let outcome = tokio::select! {
            result = server => {
                match result {
                    Ok(()) => {
                        info!("HTTP server stopped");
                        Ok(())
                    }
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        Err(DbError::internal(format!("HTTP server error: {}", e)))
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => Ok(()),
        };

        self.dispatcher.gateway().close().await;
        outcome
    }

    fn name(&self) -> &'static str {
        "http"
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

    fn transport(host: &str, port: u16, endpoint: &str) -> HttpTransport<NoopGateway> {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(NoopGateway)));
        HttpTransport::new(dispatcher, host, port, endpoint)
    }

    #[test]
    fn test_http_transport_creation() {
        let transport = transport("127.0.0.1", 3001, "/api/mcp");
        assert_eq!(transport.name(), "http");
        assert_eq!(transport.bind_addr(), "127.0.0.1:3001");
        assert_eq!(transport.endpoint(), "/api/mcp");
    }

    #[tokio::test]
    async fn test_http_transport_root_endpoint() {
        let transport = transport("0.0.0.0", 8080, "/");
        assert_eq!(transport.endpoint(), "/");
        let _router = transport.router();
    }
}
