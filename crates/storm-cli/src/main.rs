//! storm — MCP server for the Storm platform API.
//!
//! Speaks JSON-RPC on stdout, so all logging goes to stderr.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use storm_core::{ConfigStore, ToolSet};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("storm=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_store = match &cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new(),
    };
    let mut config = config_store.load()?;
    config.apply_env(|key| std::env::var(key).ok());
    tracing::debug!(path = %config_store.path().display(), ?config, "configuration loaded");

    match cli.command {
        None => commands::serve::run(config, ToolSet::All).await?,
        Some(Commands::Serve { files_root }) => {
            if files_root.is_some() {
                config.files_root = files_root;
            }
            commands::serve::run(config, ToolSet::All).await?;
        }
        Some(Commands::Files { root }) => {
            config.files_root = Some(root);
            commands::serve::run(config, ToolSet::FilesOnly).await?;
        }
        Some(Commands::Tools { name, files_root }) => {
            if files_root.is_some() {
                config.files_root = files_root;
            }
            commands::tools::run(&config, name.as_deref())?;
        }
    }

    Ok(())
}
