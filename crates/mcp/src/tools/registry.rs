// MCP tool contract and registry

use crate::params::ToolParams;
use crate::protocol::ToolSchema;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// How a tool's output string is wrapped into a `tools/call` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Plain text content.
    Text,
    /// JSON document, sent as text and as structured content.
    Json,
    /// Markdown sent as an embedded resource.
    MarkdownResource,
}

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    fn response_kind(&self) -> ResponseKind {
        ResponseKind::Text
    }

    /// File name of the embedded resource for markdown results.
    fn result_file_name(&self, _params: &ToolParams) -> String {
        format!("{}.md", self.schema().name)
    }

    /// Execute the tool with the extracted parameters
    async fn execute(&self, params: &ToolParams) -> Result<String>;
}

/// Tool registry for managing available tools.
///
/// Filled once at startup, then shared read-only behind an `Arc`. There is no
/// synchronization, so registration after sharing is not supported.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| self.tools[slot].clone())
    }

    /// All tools in registration order
    pub fn all(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// List all tool schemas in registration order
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
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

pub fn json_schema_boolean(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_string_array(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Tool returning a fixed output, for registry and dispatcher tests.
    pub(crate) struct StaticTool {
        pub name: &'static str,
        pub description: &'static str,
        pub kind: ResponseKind,
        pub output: &'static str,
    }

    impl StaticTool {
        pub fn text(name: &'static str, output: &'static str) -> Self {
            Self {
                name,
                description: "static",
                kind: ResponseKind::Text,
                output,
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for StaticTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.to_string(),
                description: self.description.to_string(),
                input_schema: json_schema_object(
                    json!({ "input": json_schema_string("Any text") }),
                    vec![],
                ),
            }
        }

        fn response_kind(&self) -> ResponseKind {
            self.kind
        }

        async fn execute(&self, _params: &ToolParams) -> Result<String> {
            Ok(self.output.to_string())
        }
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(Arc::new(StaticTool::text(name, "")));
        }
        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_reregistration_overwrites_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StaticTool::text("a", "first")));
        registry.register(Arc::new(StaticTool::text("b", "")));
        registry.register(Arc::new(StaticTool {
            description: "replacement",
            ..StaticTool::text("a", "second")
        }));

        assert_eq!(registry.len(), 2);
        let schemas = registry.list_schemas();
        assert_eq!(schemas[0].name, "a");
        assert_eq!(schemas[0].description, "replacement");
        assert!(registry.contains("b"));
        assert!(registry.get("c").is_none());
    }

    #[tokio::test]
    async fn test_default_file_name_and_kind() {
        let tool = StaticTool::text("describe", "out");
        assert_eq!(tool.response_kind(), ResponseKind::Text);
        assert_eq!(tool.result_file_name(&ToolParams::default()), "describe.md");
        assert_eq!(tool.execute(&ToolParams::default()).await.unwrap(), "out");
    }
}
