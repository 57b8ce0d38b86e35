//! MCP Tool registration and dispatch
//!
//! Tools are registered explicitly at startup into a [`ToolRegistry`], which
//! maps each tool name to its descriptor and a zero-argument handler.

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{McpError, Result};
use crate::learning;
use crate::mcp::types::{CallToolResult, Tool};

/// Zero-argument tool handler
pub type ToolFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Arguments accepted by every registered tool: none.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct NoArguments {}

struct RegisteredTool {
    tool: Tool,
    handler: ToolFn,
}

/// Registration table mapping tool names to handlers
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `what_am_i_learning` tool
    pub fn learning() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(
            learning::TOOL_NAME,
            learning::TOOL_DESCRIPTION,
            learning::what_am_i_learning,
        )?;
        Ok(registry)
    }

    /// Register a zero-argument tool.
    ///
    /// Fails if the name is empty or already taken.
    pub fn register<F>(&mut self, name: &str, description: &str, handler: F) -> Result<()>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        if name.trim().is_empty() {
            return Err(McpError::InvalidToolName {
                name: name.to_string(),
            }
            .into());
        }
        if self.contains(name) {
            return Err(McpError::DuplicateTool {
                name: name.to_string(),
            }
            .into());
        }

        debug!("Registering tool: {}", name);
        self.tools.push(RegisteredTool {
            tool: tool_def(name, description, no_arguments_schema()),
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.tool.name.as_str()).collect()
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    /// Call a tool by name
    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> CallToolResult {
        match self.invoke(name, arguments) {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                warn!("Tool call rejected: {}", e);
                CallToolResult::error(e.to_string())
            }
        }
    }

    /// Resolve a tool, check its arguments and run the handler
    pub fn invoke(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> std::result::Result<String, McpError> {
        let registered = self.find(name).ok_or_else(|| McpError::UnknownTool {
            name: name.to_string(),
        })?;

        check_no_arguments(name, arguments)?;

        debug!("Invoking tool: {}", name);
        Ok((registered.handler)())
    }

    fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.tool.name == name)
    }
}

/// Accept a missing, null, or empty-object argument payload; reject anything else.
fn check_no_arguments(tool: &str, arguments: Option<Value>) -> std::result::Result<(), McpError> {
    let invalid = |message: String| McpError::InvalidArguments {
        tool: tool.to_string(),
        message,
    };

    match arguments {
        None | Some(Value::Null) => Ok(()),
        Some(args @ Value::Object(_)) => serde_json::from_value::<NoArguments>(args)
            .map(|_| ())
            .map_err(|e| invalid(format!("this tool takes no arguments ({})", e))),
        Some(other) => Err(invalid(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
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

// ==================== Tool Schemas ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn no_arguments_schema() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(NoArguments))
        .unwrap_or_else(|_| json!({"type": "object", "additionalProperties": false}));

    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.entry("properties").or_insert_with(|| json!({}));
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LearningMcpError;

    #[test]
    fn test_learning_registry_has_single_tool() {
        let registry = ToolRegistry::learning().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["what_am_i_learning"]);
    }

    #[test]
    fn test_tool_descriptor() {
        let registry = ToolRegistry::learning().unwrap();
        let tools = registry.list_tools();
        assert_eq!(tools[0].name, "what_am_i_learning");
        assert_eq!(
            tools[0].description.as_deref(),
            Some("Responds with what the user is learning.")
        );
        assert_eq!(tools[0].input_schema["type"], "object");
        assert_eq!(tools[0].input_schema["properties"], json!({}));
        assert!(tools[0].input_schema.get("$schema").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::learning().unwrap();
        let err = registry
            .register("what_am_i_learning", "again", || "other".to_string())
            .unwrap_err();
        assert!(matches!(
            err,
            LearningMcpError::Mcp(McpError::DuplicateTool { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register("", "nothing", String::new).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_call_without_arguments() {
        let registry = ToolRegistry::learning().unwrap();
        for args in [None, Some(Value::Null), Some(json!({}))] {
            let result = registry.call_tool("what_am_i_learning", args);
            assert!(!result.is_error);
            assert_eq!(
                result.first_text(),
                Some("You are learning about MCP (Multi-Channel Processing)!")
            );
        }
    }

    #[test]
    fn test_arguments_rejected() {
        let registry = ToolRegistry::learning().unwrap();

        let result = registry.call_tool("what_am_i_learning", Some(json!({"topic": "rust"})));
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("Invalid arguments"));

        let result = registry.call_tool("what_am_i_learning", Some(json!(["rust"])));
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("expected an object, got array"));
    }

    #[test]
    fn test_rejected_arguments_skip_handler() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = ToolRegistry::new();
        registry
            .register("count", "counts calls", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "counted".to_string()
            })
            .unwrap();

        registry.call_tool("count", Some(json!({"x": 1})));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        registry.call_tool("count", None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_tool() {
        let registry = ToolRegistry::learning().unwrap();
        let result = registry.call_tool("what_am_i_teaching", None);
        assert!(result.is_error);
        assert_eq!(
            result.first_text(),
            Some("Error: Unknown tool: what_am_i_teaching")
        );
        assert!(!registry.contains("what_am_i_teaching"));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = ToolRegistry::new();
        registry.register("b", "second letter", || "b".to_string()).unwrap();
        registry.register("a", "first letter", || "a".to_string()).unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
    }
}
