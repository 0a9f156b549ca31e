//! The single boundary between tool handlers and the transport.
//!
//! Every invocation ends in a [`CallToolResult`]. Handler failures of any kind
//! (configuration, policy, HTTP, SQL) are rendered here as
//! `Error: <message>` with `isError: true`; nothing propagates past `invoke`.

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::ToolRegistry;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub struct Dispatcher {
    registry: ToolRegistry,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// The static tool catalog, in registration order.
    pub fn list_tools(&self) -> &[ToolSchema] {
        self.registry.list_schemas()
    }

    /// Look up `name`, run its handler and wrap the outcome.
    pub async fn invoke(&self, name: &str, arguments: Value) -> CallToolResult {
        let (Some(tool), Some(schema)) = (self.registry.get(name), self.registry.schema(name))
        else {
            warn!(tool = name, "Unknown tool requested");
            return CallToolResult::error(format!("Unknown tool: {}", name));
        };

        let arguments = match normalize_arguments(arguments) {
            Ok(args) => args,
            Err(message) => return CallToolResult::error(message),
        };

        let missing = missing_required(&schema.input_schema, &arguments);
        if !missing.is_empty() {
            return CallToolResult::error(format!(
                "Missing required argument(s) for {}: {}",
                name,
                missing.join(", ")
            ));
        }

        debug!(tool = name, "Invoking tool");
        match tool.execute(arguments).await {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                warn!(tool = name, error = %format!("{:#}", e), "Tool failed");
                CallToolResult::error(format!("{:#}", e))
            }
        }
    }
}

fn normalize_arguments(arguments: Value) -> Result<Value, String> {
    match arguments {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(arguments),
        other => Err(format!(
            "Tool arguments must be an object, got: {}",
            json_kind(&other)
        )),
    }
}

fn missing_required(input_schema: &Value, arguments: &Value) -> Vec<String> {
    let Some(required) = input_schema.get("required").and_then(Value::as_array) else {
        return Vec::new();
    };

    required
        .iter()
        .filter_map(Value::as_str)
        .filter(|field| arguments.get(*field).map_or(true, Value::is_null))
        .map(str::to_string)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolSchema;
    use crate::tools::{json_schema_object, json_schema_string, Tool};
    use anyhow::{bail, Context, Result};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct EchoTool {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "test.echo".to_string(),
                title: None,
                description: "Echo the message".to_string(),
                input_schema: json_schema_object(
                    json!({"message": json_schema_string("Text to echo")}),
                    vec!["message"],
                ),
                annotations: None,
            }
        }

        async fn execute(&self, arguments: Value) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let message = arguments["message"]
                .as_str()
                .context("message must be a string")?;
            if message == "fail" {
                bail!("backend unavailable");
            }
            Ok(format!("echo: {}", message))
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<EchoTool>) {
        let tool = Arc::new(EchoTool {
            calls: AtomicUsize::new(0),
        });
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone()).unwrap();
        (Dispatcher::new(registry), tool)
    }

    #[tokio::test]
    async fn test_success_wraps_handler_text() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher
            .invoke("test.echo", json!({"message": "hi"}))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.first_text(), Some("echo: hi"));
    }

    #[tokio::test]
    async fn test_unknown_tool_names_the_tool() {
        let (dispatcher, tool) = dispatcher();
        let result = dispatcher.invoke("jira.deleteEverything", json!({})).await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("jira.deleteEverything"));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_envelope() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher
            .invoke("test.echo", json!({"message": "fail"}))
            .await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Error: backend unavailable"));
    }

    #[tokio::test]
    async fn test_error_chain_is_rendered() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher.invoke("test.echo", json!({"message": 5})).await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Error: message must be a string"));
    }

    #[tokio::test]
    async fn test_missing_required_field_skips_handler() {
        let (dispatcher, tool) = dispatcher();
        let result = dispatcher.invoke("test.echo", Value::Null).await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("message"));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_object_arguments_rejected() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher.invoke("test.echo", json!(["hi"])).await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("array"));
    }

    #[test]
    fn test_list_tools_is_the_registry_catalog() {
        let (dispatcher, _) = dispatcher();
        let tools = dispatcher.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "test.echo");
    }
}
