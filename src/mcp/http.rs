use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::future::Future;
use std::sync::Arc;

use super::McpServer;

/// Stateless MCP over HTTP: one JSON-RPC message per POST, JSON reply.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_post))
        .with_state(server)
}

async fn handle_post(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve(
    server: Arc<McpServer>,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log::info!("MCP HTTP listening on http://{}/mcp", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(async {
            shutdown.await;
            log::info!("MCP HTTP: shutdown requested");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::inference::testing::ScriptedClient;
    use crate::tools::Toolbox;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn mcp_server(responses: &[&str]) -> Arc<McpServer> {
        let client = Arc::new(ScriptedClient::replying(responses));
        let toolbox = Toolbox::new(client, &TuningConfig::default());
        Arc::new(McpServer::new("text-tools", toolbox))
    }

    fn app(responses: &[&str]) -> Router {
        router(mcp_server(responses))
    }

    fn post_mcp(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_http_tools_call() {
        let response = app(&["A short summary."])
            .oneshot(post_mcp(
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"summarize_text","arguments":{"text":"long text"}}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["result"]["content"][0]["text"], "A short summary.");
    }

    #[tokio::test]
    async fn test_http_notification_is_accepted() {
        let response = app(&[])
            .oneshot(post_mcp(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_http_rejects_get() {
        let response = app(&[])
            .oneshot(Request::builder().uri("/mcp").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            serve(mcp_server(&[]), "127.0.0.1:0", std::future::ready(())),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_serve_reports_bad_address() {
        let err = serve(mcp_server(&[]), "not an address", std::future::ready(()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to bind not an address"));
    }
}
