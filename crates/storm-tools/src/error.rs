//! Error types for the storm-tools crate.

use storm_gateway::GatewayError;
use storm_sandbox::SandboxError;

/// Errors that can occur while validating or executing a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("Tool '{0}' not found.")]
    UnknownTool(String),

    /// A required argument is absent, null or blank.
    #[error("{0} is required")]
    MissingRequiredArgument(String),

    /// Arguments are present but malformed.
    #[error("Invalid arguments: {0}")]
    InvalidArgument(String),

    /// The configured credential source has no value for this auth mode.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Local file operation failed.
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// Remote API call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Structured failure category, kept alongside the uniform error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolErrorKind {
    UnknownTool,
    MissingRequiredArgument,
    InvalidArgument,
    MissingCredential,
    AccessDenied,
    NotFound,
    NotADirectory,
    InvalidEncoding,
    UnsupportedMethod,
    RemoteApiError,
    RemoteTransportError,
    Io,
}

impl ToolError {
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::UnknownTool(_) => ToolErrorKind::UnknownTool,
            Self::MissingRequiredArgument(_) => ToolErrorKind::MissingRequiredArgument,
            Self::InvalidArgument(_) => ToolErrorKind::InvalidArgument,
            Self::MissingCredential(_) => ToolErrorKind::MissingCredential,
            Self::Sandbox(err) => match err {
                SandboxError::AccessDenied(_) => ToolErrorKind::AccessDenied,
                SandboxError::NotFound(_) => ToolErrorKind::NotFound,
                SandboxError::NotADirectory(_) => ToolErrorKind::NotADirectory,
                SandboxError::InvalidEncoding(_) => ToolErrorKind::InvalidEncoding,
                SandboxError::Io { .. } => ToolErrorKind::Io,
            },
            Self::Gateway(err) => match err {
                GatewayError::UnsupportedMethod(_) => ToolErrorKind::UnsupportedMethod,
                GatewayError::RemoteApi { .. } => ToolErrorKind::RemoteApiError,
                GatewayError::Transport(_) => ToolErrorKind::RemoteTransportError,
                GatewayError::InvalidRequest(_) => ToolErrorKind::InvalidArgument,
            },
        }
    }
}

/// The single error shape surfaced to the host for any failed call.
///
/// Its text is always `Tool call error: <message>`; the kind is available to
/// in-process callers only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Tool call error: {message}")]
pub struct ToolCallError {
    kind: ToolErrorKind,
    message: String,
}

impl ToolCallError {
    pub fn kind(&self) -> ToolErrorKind {
        self.kind
    }

    /// Underlying error message, without the uniform prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ToolError> for ToolCallError {
    fn from(err: ToolError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Errors raised while assembling a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate tool name '{0}'")]
    DuplicateTool(String),
}
