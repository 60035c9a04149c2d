//! Tool registry: the static name → handler table.

use crate::error::RegistryError;
use crate::schema::ToolDescriptor;
use crate::traits::Tool;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
struct RegisteredTool {
    descriptor: ToolDescriptor,
    tool: Arc<dyn Tool>,
}

/// Registry of available tools.
///
/// Keeps declaration order for listing and a name index for lookup. The
/// descriptor of each tool is captured once at registration and never changes.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        let descriptor = ToolDescriptor {
            name: name.clone(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
        };
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool { descriptor, tool });
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entry(name).map(|entry| Arc::clone(&entry.tool))
    }

    /// Get a tool's descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.entry(name).map(|entry| &entry.descriptor)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered tool names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|entry| entry.descriptor.name.clone())
            .collect()
    }

    /// Descriptors of all tools, in declaration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }
}
