//! Tool dispatcher: lookup, validation, execution and error wrapping.

use crate::error::{ToolCallError, ToolError};
use crate::registry::ToolRegistry;
use crate::schema::{validate_arguments, ToolDescriptor};
use crate::traits::ToolOutput;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Entry point used by the host: `list_tools` and `call_tool`.
///
/// Cloning is cheap and clones share the same immutable registry, so calls can
/// be dispatched from independent tasks.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// All descriptors in declaration order.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool call and render its result as text.
    ///
    /// Every failure, whatever its cause, comes back as a [`ToolCallError`].
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, ToolCallError> {
        match self.dispatch(name, arguments).await {
            Ok(output) => Ok(output.into_text()),
            Err(err) => {
                tracing::warn!(tool = name, kind = ?err.kind(), error = %err, "tool call failed");
                Err(err.into())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let descriptor = self
            .registry
            .descriptor(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let args = match arguments {
            Value::Object(args) => args,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::InvalidArgument(format!(
                    "arguments must be a JSON object, got {other}"
                )))
            }
        };
        validate_arguments(&descriptor.input_schema, &args)?;

        tracing::debug!(tool = name, "dispatching tool call");
        tool.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolErrorKind;
    use crate::traits::Tool;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoTool {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo arguments back"
        }
        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string"},
                    "note": {"type": "string"},
                },
                "required": ["message"],
            })
        }
        async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutput::Json(json!({
                "message": args["message"],
                "note_provided": args.contains_key("note"),
            })))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
            Err(ToolError::Sandbox(storm_sandbox::SandboxError::NotFound(
                "gone.txt".into(),
            )))
        }
    }

    fn dispatcher() -> (ToolDispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(EchoTool {
                calls: Arc::clone(&calls),
            }))
            .unwrap();
        registry.register(Arc::new(FailingTool)).unwrap();
        (ToolDispatcher::new(registry), calls)
    }

    #[tokio::test]
    async fn test_call_renders_pretty_json() {
        let (dispatcher, _) = dispatcher();
        let text = dispatcher
            .call_tool("echo", json!({"message": "hi"}))
            .await
            .unwrap();

        assert_eq!(text, "{\n  \"message\": \"hi\",\n  \"note_provided\": false\n}");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (dispatcher, _) = dispatcher();
        let err = dispatcher.call_tool("nope", json!({})).await.unwrap_err();

        assert_eq!(err.kind(), ToolErrorKind::UnknownTool);
        assert_eq!(err.to_string(), "Tool call error: Tool 'nope' not found.");
    }

    #[tokio::test]
    async fn test_missing_argument_never_reaches_handler() {
        let (dispatcher, calls) = dispatcher();
        for args in [json!({}), json!(null), json!({"message": "  "})] {
            let err = dispatcher.call_tool("echo", args).await.unwrap_err();
            assert_eq!(err.kind(), ToolErrorKind::MissingRequiredArgument);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_object_arguments_are_invalid() {
        let (dispatcher, calls) = dispatcher();
        let err = dispatcher.call_tool("echo", json!(["hi"])).await.unwrap_err();

        assert_eq!(err.kind(), ToolErrorKind::InvalidArgument);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped_with_kind() {
        let (dispatcher, _) = dispatcher();
        let err = dispatcher.call_tool("fail", json!({})).await.unwrap_err();

        assert_eq!(err.kind(), ToolErrorKind::NotFound);
        assert_eq!(err.to_string(), "Tool call error: File not found: gone.txt");
    }

    #[test]
    fn test_list_tools_in_order() {
        let (dispatcher, _) = dispatcher();
        let names: Vec<String> = dispatcher.list_tools().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "fail"]);
    }
}
