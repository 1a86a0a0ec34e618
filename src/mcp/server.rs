use serde_json::{json, Value};

use super::types::*;
use crate::error::McpError;
use crate::registry::ToolKind;
use crate::tools::Toolbox;

/// Serves the toolbox over MCP. Transport-agnostic: callers feed it raw
/// JSON-RPC messages and write back whatever it returns.
pub struct McpServer {
    info: ServerInfo,
    toolbox: Toolbox,
}

impl McpServer {
    pub fn new(name: impl Into<String>, toolbox: Toolbox) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            toolbox,
        }
    }

    /// Handle one raw message. Returns `None` for notifications.
    ///
    /// Text that is not JSON is a parse error (-32700); JSON that is not a
    /// single request object (a batch, a missing `method`) is an invalid
    /// request (-32600).
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("MCP: unparseable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    &McpError::Parse(e.to_string()),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("MCP: malformed request: {}", e);
                return Some(JsonRpcResponse::failure(
                    id,
                    &McpError::InvalidRequest(e.to_string()),
                ));
            }
        };

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        log::debug!("MCP: {} (id={:?})", request.method, request.id);

        if request.is_notification() {
            // initialized, cancelled, ... nothing to do for a stateless server
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != JSONRPC_VERSION {
            let err = McpError::InvalidRequest(format!("unsupported jsonrpc version {}", request.jsonrpc));
            return Some(JsonRpcResponse::failure(id, &err));
        }

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                log::warn!("MCP: {} failed: {}", request.method, e);
                JsonRpcResponse::failure(id, &e)
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        match method {
            "initialize" => to_value(&self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => to_value(&Self::list_tools()),
            "tools/call" => {
                let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
                    .map_err(|e| McpError::InvalidParams(e.to_string()))?;
                to_value(&self.call_tool(params).await?)
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn initialize(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            server_info: self.info.clone(),
        }
    }

    pub fn list_tools() -> ListToolsResult {
        ListToolsResult {
            tools: ToolKind::ALL
                .into_iter()
                .map(|kind| McpTool {
                    name: kind.name().to_string(),
                    description: Some(kind.description().to_string()),
                    input_schema: kind.input_schema(),
                })
                .collect(),
        }
    }

    async fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult, McpError> {
        let kind = ToolKind::from_name(&params.name)
            .ok_or_else(|| McpError::InvalidParams(format!("unknown tool: {}", params.name)))?;

        let text = params
            .arguments
            .as_ref()
            .and_then(|args| args.get("text"))
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| McpError::InvalidParams("missing required string argument: text".to_string()))?;

        let output = self.toolbox.execute(kind, text).await;

        Ok(CallToolResult {
            content: vec![ToolContent::Text { text: output }],
            is_error: false,
        })
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::inference::testing::ScriptedClient;
    use std::sync::Arc;

    fn server(responses: &[&str]) -> (McpServer, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::replying(responses));
        let toolbox = Toolbox::new(client.clone(), &TuningConfig::default());
        (McpServer::new("text-tools", toolbox), client)
    }

    #[tokio::test]
    async fn test_initialize() {
        let (server, _) = server(&[]);
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(resp.id, json!(1));
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "text-tools");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let (server, _) = server(&[]);
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap().to_string()).collect();
        assert_eq!(names, vec!["summarize_text", "analyze_sentiment", "translate_to_french"]);
        assert_eq!(tools[2]["description"], "Translate English text into French");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "text");
    }

    #[tokio::test]
    async fn test_tools_call() {
        let (server, client) = server(&["Positive."]);
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"analyze_sentiment","arguments":{"text":"Best day ever"}}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "POSITIVE");
        assert_eq!(result["isError"], false);
        assert!(client.requests()[0].prompt.contains("Best day ever"));
    }

    #[tokio::test]
    async fn test_tools_call_bad_params() {
        let (server, client) = server(&[]);

        let unknown = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"delete_everything","arguments":{"text":"x"}}}"#)
            .await
            .unwrap();
        assert_eq!(unknown.error.unwrap().code, -32602);

        let missing = server
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"summarize_text","arguments":{}}}"#)
            .await
            .unwrap();
        assert_eq!(missing.error.unwrap().code, -32602);

        let blank = server
            .handle_message(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"summarize_text","arguments":{"text":"   "}}}"#)
            .await
            .unwrap();
        assert_eq!(blank.error.unwrap().code, -32602);

        let not_a_string = server
            .handle_message(r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"translate_to_french","arguments":{"text":42}}}"#)
            .await
            .unwrap();
        assert_eq!(not_a_string.error.unwrap().code, -32602);

        let no_params = server
            .handle_message(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call"}"#)
            .await
            .unwrap();
        assert_eq!(no_params.error.unwrap().code, -32602);

        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let (server, _) = server(&[]);

        let garbage = server.handle_message("{not json").await.unwrap();
        assert_eq!(garbage.id, Value::Null);
        assert_eq!(garbage.error.unwrap().code, -32700);

        let unknown = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(unknown.error.unwrap().code, -32601);

        let old = server
            .handle_message(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(old.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_json_that_is_not_a_request() {
        let (server, client) = server(&[]);

        let no_method = server
            .handle_message(r#"{"jsonrpc":"2.0","id":5}"#)
            .await
            .unwrap();
        assert_eq!(no_method.id, json!(5));
        assert_eq!(no_method.error.unwrap().code, -32600);

        let batch = server
            .handle_message(r#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#)
            .await
            .unwrap();
        assert_eq!(batch.id, Value::Null);
        assert_eq!(batch.error.unwrap().code, -32600);

        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let (server, _) = server(&[]);
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.result.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let (server, _) = server(&[]);
        assert!(server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }
}
