//! Single-upstream HTTP reverse proxy.
//!
//! Every request is forwarded to one upstream origin with its method, path,
//! query, body and end-to-end headers. The upstream status, headers and body
//! are streamed back. Upstream failures become `502 Bad Gateway`.

use crate::config::ProxyConfig;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use url::Url;

/// Largest request body buffered before forwarding.
pub const MAX_REQUEST_BODY: usize = 16 * 1024 * 1024;

/// Time allowed for open streams to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Connection-scoped headers that must not be forwarded, plus `host`.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Proxy server error: {0}")]
    Serve(std::io::Error),
}

#[derive(Debug, Clone)]
struct ProxyState {
    client: reqwest::Client,
    upstream: Url,
}

/// Build the proxy router for `upstream`.
pub fn router(upstream: Url) -> Result<Router, ProxyError> {
    let client = reqwest::Client::builder().build()?;
    let state = Arc::new(ProxyState { client, upstream });
    Ok(Router::new().fallback(forward).with_state(state))
}

/// Bind, serve until Ctrl-C, then stop accepting connections.
pub async fn run(config: &ProxyConfig) -> Result<(), ProxyError> {
    let addr = config.bind_addr();
    let app = router(config.upstream.clone())?;
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ProxyError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(addr = %addr, upstream = %config.upstream, "Proxy listening");

    let shutdown_notify = Arc::new(tokio::sync::Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Shutting down proxy");
        shutdown_notify_clone.notify_one();
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

    tokio::select! {
        result = server => result.map_err(ProxyError::Serve)?,
        _ = async {
            shutdown_notify.notified().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => warn!("Open streams did not finish in time, closing"),
    }

    info!("Proxy stopped");
    Ok(())
}

async fn forward(State(state): State<Arc<ProxyState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = upstream_url(&state.upstream, path_and_query);

    info!(
        method = %parts.method,
        path = %parts.uri.path(),
        "{} {} → {}",
        parts.method,
        parts.uri.path(),
        state.upstream
    );

    let body = match to_bytes(body, MAX_REQUEST_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    let upstream_response = state
        .client
        .request(parts.method.clone(), target.as_str())
        .headers(forwardable_headers(&parts.headers))
        .body(body)
        .send()
        .await;

    match upstream_response {
        Ok(upstream) => relay(upstream),
        Err(e) => {
            error!(error = %e, target = %target, "Upstream request failed");
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}

fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = forwardable_headers(upstream.headers());
    let stream = upstream
        .bytes_stream()
        .inspect_err(|e| warn!(error = %e, "Upstream stream interrupted"));

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Join the upstream origin with a request's path and query.
pub fn upstream_url(upstream: &Url, path_and_query: &str) -> String {
    format!(
        "{}{}",
        upstream.as_str().trim_end_matches('/'),
        path_and_query
    )
}

/// Copy of `headers` without hop-by-hop headers, including any named by
/// `Connection`.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let connection_listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .collect();

    headers
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            !HOP_BY_HOP.contains(&name) && !connection_listed.iter().any(|listed| listed == name)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_upstream_url_joins_path_and_query() {
        let upstream = Url::parse("http://localhost:3001").unwrap();
        assert_eq!(
            upstream_url(&upstream, "/api/mcp?session=1"),
            "http://localhost:3001/api/mcp?session=1"
        );
        assert_eq!(upstream_url(&upstream, "/"), "http://localhost:3001/");
    }

    #[test]
    fn test_forwardable_headers_strips_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3002"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace", HeaderValue::from_static("abc"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("mcp-session-id", HeaderValue::from_static("s-1"));

        let forwarded = forwardable_headers(&headers);
        assert_eq!(forwarded.len(), 2);
        assert_eq!(forwarded[header::CONTENT_TYPE], "application/json");
        assert_eq!(forwarded["mcp-session-id"], "s-1");
    }

    #[test]
    fn test_forwardable_headers_keeps_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.append(header::ACCEPT, HeaderValue::from_static("text/event-stream"));
        let forwarded = forwardable_headers(&headers);
        assert_eq!(forwarded.get_all(header::ACCEPT).iter().count(), 2);
    }
}
