// MCP server: newline-delimited JSON-RPC over stdio

use crate::dispatcher::Dispatcher;
use crate::framing::{Frame, LineFramer};
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability, DEFAULT_PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

pub struct McpServer {
    info: ServerInfo,
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(info: ServerInfo, registry: ToolRegistry) -> Self {
        Self {
            info,
            dispatcher: Dispatcher::new(registry),
        }
    }

    /// Serve on the process stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one request at a time until the reader reaches EOF.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut frames = FramedRead::new(reader, LineFramer::new());
        let mut sink = FramedWrite::new(writer, LinesCodec::new());

        info!(
            server = %self.info.name,
            tools = self.dispatcher.list_tools().len(),
            "MCP server started"
        );

        while let Some(frame) = frames.next().await {
            let response = match frame.context("Failed to read from transport")? {
                Frame::Line(line) if line.trim().is_empty() => continue,
                Frame::Line(line) => self.handle_message(&line).await,
                Frame::Malformed(reason) => {
                    warn!(reason, "Malformed message");
                    Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()))
                }
            };

            if let Some(response) = response {
                let encoded =
                    serde_json::to_string(&response).context("Failed to encode response")?;
                sink.send(encoded)
                    .await
                    .context("Failed to write to transport")?;
            }
        }

        info!("Transport closed");
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparsable message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(_) => return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request())),
        };

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        let response = match self.handle_request(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Some(response)
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        debug!(method = %request.method, "Request received");

        match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("protocolVersion"))
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION)
                    .to_string();

                to_value(InitializeResult {
                    protocol_version,
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability {
                            list_changed: false,
                        }),
                    },
                    server_info: self.info.clone(),
                })
            }
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_value(ListToolsResult {
                tools: self.dispatcher.list_tools().to_vec(),
            }),
            "tools/call" => {
                let params: CallToolParams =
                    serde_json::from_value(request.params.clone().unwrap_or(Value::Null))
                        .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;

                let result = self.dispatcher.invoke(&params.name, params.arguments).await;
                to_value(result)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolSchema;
    use crate::tools::{json_schema_object, Tool};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    struct PingTool;

    #[async_trait::async_trait]
    impl Tool for PingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "test.pong".to_string(),
                title: Some("Pong".to_string()),
                description: "Always answers pong".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
                annotations: None,
            }
        }

        async fn execute(&self, _arguments: Value) -> anyhow::Result<String> {
            Ok("pong".to_string())
        }
    }

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(PingTool)).unwrap();
        McpServer::new(ServerInfo::new("test-server", "0.0.1"), registry)
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18","capabilities":{},"clientInfo":{"name":"c","version":"1"}}}"#,
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-06-18");
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#)
            .await
            .unwrap();

        assert_eq!(response.id, json!("a"));
        let tools = &response.result.unwrap()["tools"];
        assert_eq!(tools[0]["name"], "test.pong");
        assert_eq!(tools[0]["annotations"]["readOnlyHint"], true);
    }

    #[tokio::test]
    async fn test_tools_call_success_and_unknown() {
        let server = server();

        let ok = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"test.pong"}}"#,
            )
            .await
            .unwrap();
        assert_eq!(
            ok.result.unwrap(),
            json!({"content": [{"type": "text", "text": "pong"}], "isError": false})
        );

        let unknown = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
            )
            .await
            .unwrap();
        let result = unknown.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server();

        let parse = server.handle_message("{not json").await.unwrap();
        assert_eq!(parse.error.unwrap().code, -32700);

        let missing = server
            .handle_message(r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(missing.error.unwrap().code, -32601);

        let bad_params = server
            .handle_message(r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(bad_params.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_notifications_are_silent() {
        let response = server()
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_serve_over_duplex() {
        let (client, server_io) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_io);
        let (client_read, mut client_write) = tokio::io::split(client);

        let handle = tokio::spawn(async move { server().serve(server_read, server_write).await });

        client_write
            .write_all(
                b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\n",
            )
            .await
            .unwrap();

        let mut reader = BufReader::new(client_read);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let response: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(response["id"], 7);
        assert_eq!(response["result"], json!({}));

        client_write.shutdown().await.unwrap();
        drop(client_write);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let response = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_serving() {
        let (client, server_io) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_io);
        let (client_read, mut client_write) = tokio::io::split(client);

        let handle = tokio::spawn(async move { server().serve(server_read, server_write).await });

        client_write
            .write_all(b"\xff\xfe\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .await
            .unwrap();

        let mut reader = BufReader::new(client_read);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let first: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(first["id"], Value::Null);
        assert_eq!(first["error"]["code"], -32700);

        line.clear();
        reader.read_line(&mut line).await.unwrap();
        let second: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(second["id"], 1);
        assert_eq!(second["result"], json!({}));

        client_write.shutdown().await.unwrap();
        drop(client_write);
        handle.await.unwrap().unwrap();
    }
}
