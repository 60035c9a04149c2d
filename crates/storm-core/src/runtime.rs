//! Assemble the tool dispatcher from a loaded [`Config`].

use crate::config::Config;
use crate::error::{ConfigError, StormError};
use std::sync::Arc;
use storm_gateway::RemoteGateway;
use storm_sandbox::FileManager;
use storm_tools::{register_file_tools, register_platform_tools, PlatformContext, ToolDispatcher, ToolRegistry};

/// Which tool families a server publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSet {
    /// Platform tools, plus the file tools when a files root is configured.
    All,
    /// File tools only; a files root is required.
    FilesOnly,
}

/// Build the dispatcher and, when configured, the sandboxed file root.
pub fn build_dispatcher(
    config: &Config,
    tool_set: ToolSet,
) -> Result<(ToolDispatcher, Option<Arc<FileManager>>), StormError> {
    config.validate()?;

    let files = match &config.files_root {
        Some(root) => Some(Arc::new(FileManager::new(root)?)),
        None if tool_set == ToolSet::FilesOnly => {
            return Err(ConfigError::Invalid {
                field: "files_root",
                message: "the file server needs a files root".to_string(),
            }
            .into())
        }
        None => None,
    };

    let mut registry = ToolRegistry::new();
    if tool_set == ToolSet::All {
        let gateway = RemoteGateway::new(config.gateway_config())?;
        let mut ctx = PlatformContext::new(gateway, config.credentials())
            .with_upload_field(config.upload_field.trim());
        if let Some(files) = &files {
            ctx = ctx.with_files(Arc::clone(files));
        }
        register_platform_tools(&mut registry, Arc::new(ctx))?;
    }
    if let Some(files) = &files {
        register_file_tools(&mut registry, Arc::clone(files))?;
    }

    tracing::debug!(
        tools = registry.len(),
        files_root = ?files.as_ref().map(|f| f.root().to_path_buf()),
        "tool registry assembled"
    );
    Ok((ToolDispatcher::new(registry), files))
}
