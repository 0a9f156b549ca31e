// Tool trait and the static registry each adapter builds at startup

use crate::protocol::{ToolAnnotations, ToolSchema};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool executor trait
///
/// Handlers return the formatted text on success. Failures are turned into an
/// error envelope by the [`Dispatcher`](crate::Dispatcher), so handlers never
/// format errors themselves.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<String>;

    /// Whether the tool only reads from the backing system
    fn read_only(&self) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    Duplicate(String),
}

/// Tool registry for managing available tools
///
/// Keeps registration order so `tools/list` is stable across calls.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    schemas: Vec<ToolSchema>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            schemas: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a tool. Names are unique per process.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let mut schema = tool.schema();
        if self.by_name.contains_key(&schema.name) {
            return Err(RegistryError::Duplicate(schema.name));
        }
        if schema.annotations.is_none() {
            schema.annotations = Some(ToolAnnotations {
                read_only_hint: tool.read_only(),
            });
        }

        self.by_name.insert(schema.name.clone(), self.tools.len());
        self.schemas.push(schema);
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.by_name.get(name).map(|&idx| self.tools[idx].clone())
    }

    /// Schema of a registered tool
    pub fn schema(&self, name: &str) -> Option<&ToolSchema> {
        self.by_name.get(name).map(|&idx| &self.schemas[idx])
    }

    /// List all tool schemas, computed once at registration
    pub fn list_schemas(&self) -> &[ToolSchema] {
        &self.schemas
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_number(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "number",
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_array(items: serde_json::Value, description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}
