//! Tool trait definition and common types.

use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Result of a tool execution before it is rendered for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Structured data, rendered as pretty-printed JSON.
    Json(Value),
    /// Text passed through unchanged.
    Text(String),
}

impl ToolOutput {
    /// Render as the single text block returned to the host.
    pub fn into_text(self) -> String {
        match self {
            Self::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
            Self::Text(text) => text,
        }
    }
}

/// Trait that all tools must implement.
///
/// Arguments reach `execute` only after the dispatcher has validated them
/// against `input_schema`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Machine-readable tool name (e.g., "list_agents").
    fn name(&self) -> &str;

    /// Description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's arguments.
    fn input_schema(&self) -> Value;

    /// Execute the tool with validated arguments.
    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError>;
}

// Compile-time check: Tool must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn Tool) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_output_is_pretty_and_keeps_unicode() {
        let text = ToolOutput::Json(json!({"answer": "안녕하세요", "n": 1})).into_text();
        assert!(text.contains("\n  \"answer\": \"안녕하세요\""));
    }

    #[test]
    fn test_text_output_passes_through() {
        assert_eq!(ToolOutput::Text("done".into()).into_text(), "done");
    }
}
