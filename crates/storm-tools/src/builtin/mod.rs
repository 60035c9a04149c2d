//! Built-in tool implementations.
//!
//! Platform tools proxy the Storm API through the shared gateway; file tools
//! operate on the sandboxed file manager.

pub mod agents;
pub mod chat;
pub mod documents;
pub mod files;

use crate::credentials::Credentials;
use crate::error::{RegistryError, ToolError};
use crate::ToolRegistry;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use storm_gateway::RemoteGateway;
use storm_sandbox::FileManager;

/// Default multipart field name for document uploads.
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

/// Collaborators shared by all platform tools.
#[derive(Debug)]
pub struct PlatformContext {
    pub gateway: RemoteGateway,
    pub credentials: Credentials,
    /// Multipart field carrying the uploaded document.
    pub upload_field: String,
    /// Sandbox used to read `file_path` uploads. Without it only base64
    /// uploads are accepted.
    pub files: Option<Arc<FileManager>>,
}

impl PlatformContext {
    pub fn new(gateway: RemoteGateway, credentials: Credentials) -> Self {
        Self {
            gateway,
            credentials,
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
            files: None,
        }
    }

    pub fn with_upload_field(mut self, field: impl Into<String>) -> Self {
        self.upload_field = field.into();
        self
    }

    pub fn with_files(mut self, files: Arc<FileManager>) -> Self {
        self.files = Some(files);
        self
    }
}

/// Register the Storm platform tools into a registry.
pub fn register_platform_tools(
    registry: &mut ToolRegistry,
    ctx: Arc<PlatformContext>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(chat::SendChatTool::new(Arc::clone(&ctx))))?;
    registry.register(Arc::new(agents::ListAgentsTool::new(Arc::clone(&ctx))))?;
    registry.register(Arc::new(agents::ListBucketsTool::new(Arc::clone(&ctx))))?;
    registry.register(Arc::new(documents::UploadDocumentTool::new(ctx)))?;
    Ok(())
}

/// Register the sandboxed file tools into a registry.
pub fn register_file_tools(
    registry: &mut ToolRegistry,
    files: Arc<FileManager>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(files::UploadFileTool::new(Arc::clone(&files))))?;
    registry.register(Arc::new(files::SearchFilesTool::new(Arc::clone(&files))))?;
    registry.register(Arc::new(files::ReadFileTool::new(Arc::clone(&files))))?;
    registry.register(Arc::new(files::ListDirectoryTool::new(files)))?;
    Ok(())
}

fn parse_params<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| ToolError::InvalidArgument(e.to_string()))
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn insert_non_blank(body: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = non_blank(value) {
        body.insert(key.to_string(), Value::String(value));
    }
}
