//! Error types for the storm-gateway crate.

/// Errors that can occur while calling the remote API.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Method other than GET, POST or DELETE.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Upstream answered with status >= 400. Body is kept verbatim.
    #[error("API error: {status} - {body}")]
    RemoteApi { status: u16, body: String },

    /// Network-level failure, including timeouts.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be assembled.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Whether the failure was a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}
