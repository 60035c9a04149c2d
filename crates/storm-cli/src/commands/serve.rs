use storm_core::{build_dispatcher, Config, ToolSet};
use storm_mcp::McpServer;

pub async fn run(config: Config, tool_set: ToolSet) -> anyhow::Result<()> {
    let (dispatcher, files) = build_dispatcher(&config, tool_set)?;
    let name = match tool_set {
        ToolSet::All => "storm-mcp-server",
        ToolSet::FilesOnly => "storm-file-server",
    };

    let mut server = McpServer::new(dispatcher).with_server_info(name, env!("CARGO_PKG_VERSION"));
    if let Some(files) = files {
        tracing::info!(root = %files.root().display(), "publishing file tools");
        server = server.with_files(files);
    }

    server.serve_stdio().await?;
    Ok(())
}
