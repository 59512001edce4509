//! Integration tests for the reverse proxy using local listeners.

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use edu_db_mcp::proxy;
use tokio::net::TcpListener;
use url::Url;

/// Echo the request line, selected headers and body back as text.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    let marker = headers
        .get("x-forwarded-test")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    (
        StatusCode::ACCEPTED,
        format!(
            "{} {} {} {}",
            method,
            uri,
            marker,
            String::from_utf8_lossy(&body)
        ),
    )
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn unused_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_proxy_forwards_method_path_headers_and_body() {
    let upstream = spawn(Router::new().fallback(echo)).await;
    let proxy_origin = spawn(proxy::router(Url::parse(&upstream).unwrap()).unwrap()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/mcp?x=1", proxy_origin))
        .header("x-forwarded-test", "kept")
        .body(r#"{"jsonrpc":"2.0"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    let body = response.text().await.unwrap();
    assert_eq!(body, r#"POST /api/mcp?x=1 kept {"jsonrpc":"2.0"}"#);
}

#[tokio::test]
async fn test_proxy_returns_bad_gateway_when_upstream_is_down() {
    let upstream = unused_origin().await;
    let proxy_origin = spawn(proxy::router(Url::parse(&upstream).unwrap()).unwrap()).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/mcp", proxy_origin))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
}
