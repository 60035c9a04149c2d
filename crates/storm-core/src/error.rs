//! Error types for the storm-core crate.

use std::path::PathBuf;

/// Failures loading or validating the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value the server cannot run with.
    #[error("invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Core error type raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum StormError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Gateway setup failed: {0}")]
    Gateway(#[from] storm_gateway::GatewayError),

    #[error("File root unavailable: {0}")]
    Sandbox(#[from] storm_sandbox::SandboxError),

    #[error("Tool registration failed: {0}")]
    Registry(#[from] storm_tools::RegistryError),
}
