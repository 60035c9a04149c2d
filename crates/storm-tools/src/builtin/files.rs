//! File tools — upload, search, read and list inside the sandbox root.

use super::parse_params;
use crate::error::ToolError;
use crate::schema::schema_of;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use storm_sandbox::FileManager;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadFileParams {
    /// Destination path inside the file root.
    pub path: String,
    /// Base64-encoded file content.
    #[serde(rename = "fileContent")]
    pub file_content: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchFilesParams {
    /// Case-insensitive substring to look for in file names.
    pub pattern: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// File path inside the file root.
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryParams {
    /// Directory inside the file root. Defaults to the root itself.
    pub path: Option<String>,
}

pub struct UploadFileTool {
    files: Arc<FileManager>,
}

impl UploadFileTool {
    pub fn new(files: Arc<FileManager>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for UploadFileTool {
    fn name(&self) -> &str {
        "upload_file"
    }
    fn description(&self) -> &str {
        "Upload a file (base64-encoded content) into the server's file root. \
         Overwrites any existing file."
    }
    fn input_schema(&self) -> Value {
        schema_of::<UploadFileParams>()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let params: UploadFileParams = parse_params(args)?;
        self.files
            .upload_file(&params.path, &params.file_content)
            .await?;
        Ok(ToolOutput::Text(format!(
            "File uploaded successfully: {}",
            params.path
        )))
    }
}

pub struct SearchFilesTool {
    files: Arc<FileManager>,
}

impl SearchFilesTool {
    pub fn new(files: Arc<FileManager>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }
    fn description(&self) -> &str {
        "Search the file root recursively for files whose name contains the pattern."
    }
    fn input_schema(&self) -> Value {
        schema_of::<SearchFilesParams>()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let params: SearchFilesParams = parse_params(args)?;
        let results = self.files.search_files(&params.pattern).await?;
        if results.is_empty() {
            return Ok(ToolOutput::Text("No files found".to_string()));
        }

        let lines: Vec<String> = results
            .iter()
            .map(|entry| format!("[{}] {}", entry.kind.as_str(), entry.path))
            .collect();
        Ok(ToolOutput::Text(lines.join("\n")))
    }
}

pub struct ReadFileTool {
    files: Arc<FileManager>,
}

impl ReadFileTool {
    pub fn new(files: Arc<FileManager>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }
    fn description(&self) -> &str {
        "Read a UTF-8 text file from the server's file root."
    }
    fn input_schema(&self) -> Value {
        schema_of::<ReadFileParams>()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let params: ReadFileParams = parse_params(args)?;
        let (content, _) = self.files.read_file(&params.path).await?;
        Ok(ToolOutput::Text(content))
    }
}

pub struct ListDirectoryTool {
    files: Arc<FileManager>,
}

impl ListDirectoryTool {
    pub fn new(files: Arc<FileManager>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }
    fn description(&self) -> &str {
        "List the entries of a directory in the server's file root (non-recursive)."
    }
    fn input_schema(&self) -> Value {
        schema_of::<ListDirectoryParams>()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let params: ListDirectoryParams = parse_params(args)?;
        let entries = self
            .files
            .list_directory(params.path.as_deref().unwrap_or(""))
            .await?;
        Ok(ToolOutput::Json(serde_json::json!(entries)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use storm_sandbox::SandboxError;
    use tempfile::TempDir;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn files(dir: &TempDir) -> Arc<FileManager> {
        Arc::new(FileManager::new(dir.path()).unwrap())
    }

    #[tokio::test]
    async fn test_upload_file_reports_success() {
        let dir = TempDir::new().unwrap();
        let fm = files(&dir);

        let out = UploadFileTool::new(Arc::clone(&fm))
            .execute(args(json!({"path": "in/a.txt", "fileContent": "aGVsbG8="})))
            .await
            .unwrap();

        assert_eq!(out, ToolOutput::Text("File uploaded successfully: in/a.txt".into()));
        assert_eq!(fs::read_to_string(fm.root().join("in/a.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_search_files_formats_lines() {
        let dir = TempDir::new().unwrap();
        let fm = files(&dir);
        fs::create_dir_all(fm.root().join("a")).unwrap();
        fs::write(fm.root().join("a/Report.txt"), "r").unwrap();

        let out = SearchFilesTool::new(Arc::clone(&fm))
            .execute(args(json!({"pattern": "report"})))
            .await
            .unwrap();
        assert_eq!(out, ToolOutput::Text("[file] a/Report.txt".into()));

        let out = SearchFilesTool::new(fm)
            .execute(args(json!({"pattern": "zzz"})))
            .await
            .unwrap();
        assert_eq!(out, ToolOutput::Text("No files found".into()));
    }

    #[tokio::test]
    async fn test_read_file_outside_root_is_denied() {
        let dir = TempDir::new().unwrap();
        let fm = Arc::new(FileManager::new(dir.path().join("root")).unwrap());
        fs::write(dir.path().join("secret.txt"), "s").unwrap();

        let err = ReadFileTool::new(fm)
            .execute(args(json!({"path": "../secret.txt"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Sandbox(SandboxError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_list_directory_defaults_to_root() {
        let dir = TempDir::new().unwrap();
        let fm = files(&dir);
        fs::write(fm.root().join("top.txt"), "abc").unwrap();

        let out = ListDirectoryTool::new(fm)
            .execute(Map::new())
            .await
            .unwrap();
        match out {
            ToolOutput::Json(value) => {
                assert_eq!(value[0]["name"], "top.txt");
                assert_eq!(value[0]["type"], "file");
                assert_eq!(value[0]["size"], 3);
            }
            other => panic!("expected JSON listing, got {other:?}"),
        }
    }
}
