//! MCP stdio server exposing the Storm tools and the file-root resources.

use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use storm_sandbox::{mime, EntryKind, FileManager, SandboxError};
use storm_tools::ToolDispatcher;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

const RESOURCE_URI_PREFIX: &str = "file:///";

/// Errors raised while serving MCP requests.
///
/// Request-level variants are answered as JSON-RPC errors; the channel
/// variants end the session.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Resource error: {0}")]
    Resource(#[from] SandboxError),
    #[error("IO error on the stdio channel: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error on the stdio channel: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stdio writer stopped: {0}")]
    Writer(String),
}

impl McpError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i64 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Resource(SandboxError::NotFound(_)) => -32002,
            Self::Resource(_) | Self::Io(_) | Self::Json(_) | Self::Writer(_) => -32603,
        }
    }
}

/// Stdio MCP server backed by a [`ToolDispatcher`].
#[derive(Clone)]
pub struct McpServer {
    name: String,
    version: String,
    dispatcher: ToolDispatcher,
    files: Option<Arc<FileManager>>,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            name: "storm".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            dispatcher,
            files: None,
        }
    }

    pub fn with_server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.name = name.into();
        self.version = version.into();
        self
    }

    /// Publish the file root as MCP resources.
    pub fn with_files(mut self, files: Arc<FileManager>) -> Self {
        self.files = Some(files);
        self
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(self) -> Result<(), McpError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC until `reader` reaches EOF.
    ///
    /// Each request runs on its own task; responses go through one writer
    /// task so lines never interleave. Responses may arrive out of order.
    pub async fn serve<R, W>(self, mut reader: R, writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(message) = rx.recv().await {
                let mut payload = serde_json::to_vec(&message)?;
                payload.push(b'\n');
                writer.write_all(&payload).await?;
                writer.flush().await?;
            }
            Ok::<(), McpError>(())
        });

        tracing::info!(server = %self.name, "MCP server listening on stdio");
        // Raw bytes, so a line that is not UTF-8 is answered as a parse error.
        loop {
            let mut line = Vec::new();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    if tx.send(response).is_err() {
                        tracing::debug!("dropping response after writer shutdown");
                    }
                }
            });
        }

        // The writer drains once every in-flight request has dropped its sender.
        drop(tx);
        writer_task
            .await
            .map_err(|err| McpError::Writer(err.to_string()))??;
        tracing::info!(server = %self.name, "stdin closed, MCP server stopped");
        Ok(())
    }

    /// Handle one raw line; `None` when no response is due.
    pub async fn handle_line(&self, line: impl AsRef<[u8]>) -> Option<Value> {
        let message: Value = match serde_json::from_slice(line.as_ref()) {
            Ok(message) => message,
            Err(err) => return Some(failure(Value::Null, &McpError::Parse(err.to_string()))),
        };
        if !message.is_object() {
            return Some(failure(
                Value::Null,
                &McpError::InvalidRequest("expected a JSON object".to_string()),
            ));
        }

        let id = message.get("id").cloned();
        let Some(method) = message.get("method").and_then(Value::as_str) else {
            if message.get("result").is_some() || message.get("error").is_some() {
                return None;
            }
            return Some(failure(
                id.unwrap_or(Value::Null),
                &McpError::InvalidRequest("missing method".to_string()),
            ));
        };
        let Some(id) = id else {
            tracing::debug!(method, "ignoring notification");
            return None;
        };

        let params = message.get("params").cloned().unwrap_or(Value::Null);
        match self.handle_request(method, params).await {
            Ok(result) => Some(success(id, result)),
            Err(err) => {
                tracing::debug!(method, code = err.code(), error = %err, "request failed");
                Some(failure(id, &err))
            }
        }
    }

    /// Answer one JSON-RPC request.
    pub async fn handle_request(&self, method: &str, params: Value) -> Result<Value, McpError> {
        match method {
            "initialize" => Ok(self.initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.dispatcher.list_tools() })),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => self.list_resources().await,
            "resources/read" => self.read_resource(params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn initialize_result(&self) -> Value {
        let mut capabilities = json!({ "tools": {} });
        if self.files.is_some() {
            capabilities["resources"] = json!({});
        }
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": capabilities,
            "serverInfo": {
                "name": self.name,
                "version": self.version,
            }
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::InvalidParams("tools/call requires a tool name".to_string()))?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let (text, is_error) = match self.dispatcher.call_tool(name, arguments).await {
            Ok(text) => (text, false),
            Err(err) => (err.to_string(), true),
        };
        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
        }))
    }

    fn file_root(&self, method: &str) -> Result<&FileManager, McpError> {
        self.files
            .as_deref()
            .ok_or_else(|| McpError::MethodNotFound(method.to_string()))
    }

    async fn list_resources(&self) -> Result<Value, McpError> {
        let files = self.file_root("resources/list")?;
        let resources: Vec<Value> = files
            .list_directory("")
            .await?
            .into_iter()
            .map(|entry| {
                let (mime_type, label) = match entry.kind {
                    EntryKind::Directory => (mime::DIRECTORY_MIME, "Directory"),
                    EntryKind::File => (mime::guess(Path::new(&entry.name)), "File"),
                };
                json!({
                    "uri": format!("{RESOURCE_URI_PREFIX}{}", entry.path),
                    "name": entry.name,
                    "mimeType": mime_type,
                    "description": format!("{label}: {}", entry.path),
                })
            })
            .collect();
        Ok(json!({ "resources": resources }))
    }

    async fn read_resource(&self, params: Value) -> Result<Value, McpError> {
        let files = self.file_root("resources/read")?;
        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::InvalidParams("resources/read requires a uri".to_string()))?;
        let path = uri
            .strip_prefix(RESOURCE_URI_PREFIX)
            .ok_or_else(|| McpError::InvalidParams(format!("unsupported resource URI: {uri}")))?;

        let (text, mime_type) = files.read_file(path).await?;
        Ok(json!({
            "contents": [{ "uri": uri, "mimeType": mime_type, "text": text }],
        }))
    }
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn failure(id: Value, err: &McpError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": err.code(), "message": err.to_string() },
    })
}
