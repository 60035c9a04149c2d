//! Error types for the storm-sandbox crate.

use std::path::Path;

/// Errors raised by the path sandbox and the file manager.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The path resolves outside the sandbox root.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The path is not an existing regular file.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The path is not an existing directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Upload payload is not valid base64.
    #[error("Invalid base64 content: {0}")]
    InvalidEncoding(String),

    /// Underlying filesystem failure.
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SandboxError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
