//! Drive the MCP server over an in-memory stdio pair.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use storm_mcp::McpServer;
use storm_sandbox::FileManager;
use storm_tools::{
    register_file_tools, Tool, ToolDispatcher, ToolError, ToolOutput, ToolRegistry,
};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::task::JoinHandle;

/// Sleeps for `delay_ms` before echoing `value`.
struct SlowEcho;

#[async_trait]
impl Tool for SlowEcho {
    fn name(&self) -> &str {
        "slow_echo"
    }
    fn description(&self) -> &str {
        "Echo after a delay"
    }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "value": {"type": "string"},
                "delay_ms": {"type": "integer"}
            },
            "required": ["value"]
        })
    }
    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let delay = args.get("delay_ms").and_then(Value::as_u64).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ToolOutput::Text(
            args["value"].as_str().unwrap_or_default().to_string(),
        ))
    }
}

struct Session {
    input: tokio::io::WriteHalf<DuplexStream>,
    output: Lines<BufReader<tokio::io::ReadHalf<DuplexStream>>>,
    server: JoinHandle<Result<(), storm_mcp::McpError>>,
}

impl Session {
    fn start(server: McpServer) -> Self {
        let (client, host) = tokio::io::duplex(64 * 1024);
        let (host_read, host_write) = tokio::io::split(host);
        let server = tokio::spawn(server.serve(BufReader::new(host_read), host_write));
        let (client_read, client_write) = tokio::io::split(client);
        Self {
            input: client_write,
            output: BufReader::new(client_read).lines(),
            server,
        }
    }

    async fn send(&mut self, message: Value) {
        let mut line = serde_json::to_vec(&message).unwrap();
        line.push(b'\n');
        self.input.write_all(&line).await.unwrap();
    }

    async fn send_raw(&mut self, raw: &[u8]) {
        self.input.write_all(raw).await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.output.next_line())
            .await
            .expect("timed out waiting for a response")
            .unwrap()
            .expect("server closed stdout");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        let response = self.recv().await;
        assert_eq!(response["id"], id);
        response
    }

    async fn finish(mut self) {
        self.input.shutdown().await.unwrap();
        drop(self.input);
        self.server.await.unwrap().unwrap();
    }
}

fn file_server(dir: &TempDir) -> (McpServer, Arc<FileManager>) {
    let files = Arc::new(FileManager::new(dir.path()).unwrap());
    let mut registry = ToolRegistry::new();
    register_file_tools(&mut registry, Arc::clone(&files)).unwrap();
    let server = McpServer::new(ToolDispatcher::new(registry)).with_files(Arc::clone(&files));
    (server, files)
}

#[tokio::test]
async fn test_handshake_and_tool_listing() {
    let dir = TempDir::new().unwrap();
    let (server, _) = file_server(&dir);
    let mut session = Session::start(server);

    let init = session
        .request(1, "initialize", json!({"protocolVersion": "2025-06-18", "capabilities": {}}))
        .await;
    assert_eq!(init["result"]["serverInfo"]["name"], "storm");
    assert!(init["result"]["capabilities"]["resources"].is_object());

    session
        .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;
    let pong = session.request(2, "ping", json!({})).await;
    assert_eq!(pong["result"], json!({}));

    let listed = session.request(3, "tools/list", json!({})).await;
    let tools = listed["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 4);
    assert_eq!(tools[0]["name"], "upload_file");
    let required = tools[0]["inputSchema"]["required"].as_array().unwrap();
    assert!(required.contains(&json!("path")));
    assert!(required.contains(&json!("fileContent")));

    session.finish().await;
}

#[tokio::test]
async fn test_tool_call_success_and_failure() {
    let dir = TempDir::new().unwrap();
    let (server, files) = file_server(&dir);
    let mut session = Session::start(server);

    let uploaded = session
        .request(
            1,
            "tools/call",
            json!({"name": "upload_file", "arguments": {"path": "a.txt", "fileContent": "aGVsbG8="}}),
        )
        .await;
    assert_eq!(uploaded["result"]["isError"], false);
    assert_eq!(
        uploaded["result"]["content"][0]["text"],
        "File uploaded successfully: a.txt"
    );
    assert_eq!(fs::read_to_string(files.root().join("a.txt")).unwrap(), "hello");

    let missing = session
        .request(2, "tools/call", json!({"name": "read_file", "arguments": {}}))
        .await;
    assert_eq!(missing["result"]["isError"], true);
    assert_eq!(
        missing["result"]["content"][0]["text"],
        "Tool call error: path is required"
    );

    let unknown = session
        .request(3, "tools/call", json!({"name": "nope", "arguments": {}}))
        .await;
    assert_eq!(unknown["result"]["isError"], true);

    session.finish().await;
}

#[tokio::test]
async fn test_resources() {
    let dir = TempDir::new().unwrap();
    let (server, files) = file_server(&dir);
    fs::create_dir_all(files.root().join("docs")).unwrap();
    fs::write(files.root().join("notes.md"), "# hi").unwrap();
    let mut session = Session::start(server);

    let listed = session.request(1, "resources/list", json!({})).await;
    let resources = listed["result"]["resources"].as_array().unwrap();
    let by_uri: HashMap<&str, &Value> = resources
        .iter()
        .map(|r| (r["uri"].as_str().unwrap(), r))
        .collect();
    assert_eq!(by_uri.len(), 2);
    assert_eq!(by_uri["file:///docs"]["mimeType"], "inode/directory");
    assert_eq!(by_uri["file:///docs"]["description"], "Directory: docs");
    assert_eq!(by_uri["file:///notes.md"]["mimeType"], "text/markdown");
    assert_eq!(by_uri["file:///notes.md"]["description"], "File: notes.md");

    let read = session
        .request(2, "resources/read", json!({"uri": "file:///notes.md"}))
        .await;
    assert_eq!(read["result"]["contents"][0]["text"], "# hi");
    assert_eq!(read["result"]["contents"][0]["uri"], "file:///notes.md");

    let escaped = session
        .request(3, "resources/read", json!({"uri": "file:///../outside.txt"}))
        .await;
    assert!(escaped["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Access denied"));

    let bad = session
        .request(4, "resources/read", json!({"uri": "https://example.com/x"}))
        .await;
    assert_eq!(bad["error"]["code"], -32602);

    session.finish().await;
}

#[tokio::test]
async fn test_malformed_lines_do_not_end_the_session() {
    let dir = TempDir::new().unwrap();
    let (server, _) = file_server(&dir);
    let mut session = Session::start(server);

    session.send_raw(b"this is not json\n\n").await;
    let parse_error = session.recv().await;
    assert_eq!(parse_error["error"]["code"], -32700);

    let unknown = session.request(7, "sampling/createMessage", json!({})).await;
    assert_eq!(unknown["error"]["code"], -32601);

    let pong = session.request(8, "ping", Value::Null).await;
    assert_eq!(pong["result"], json!({}));

    session.finish().await;
}

#[tokio::test]
async fn test_invalid_utf8_line_gets_parse_error() {
    let dir = TempDir::new().unwrap();
    let (server, _) = file_server(&dir);
    let mut session = Session::start(server);

    session.send_raw(b"\xff\xfe\n").await;
    let parse_error = session.recv().await;
    assert_eq!(parse_error["id"], Value::Null);
    assert_eq!(parse_error["error"]["code"], -32700);

    let pong = session.request(1, "ping", json!({})).await;
    assert_eq!(pong["result"], json!({}));

    session.finish().await;
}

#[tokio::test]
async fn test_slow_call_does_not_block_others() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SlowEcho)).unwrap();
    let mut session = Session::start(McpServer::new(ToolDispatcher::new(registry)));

    session
        .send(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "slow_echo", "arguments": {"value": "slow", "delay_ms": 300}}}))
        .await;
    session
        .send(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": {"name": "slow_echo", "arguments": {"value": "fast"}}}))
        .await;

    let first = session.recv().await;
    let second = session.recv().await;
    assert_eq!(first["id"], 2);
    assert_eq!(first["result"]["content"][0]["text"], "fast");
    assert_eq!(second["id"], 1);
    assert_eq!(second["result"]["content"][0]["text"], "slow");

    session.finish().await;
}
