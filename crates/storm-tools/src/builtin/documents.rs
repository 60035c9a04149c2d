//! upload_document_by_file — multipart upload to `/api/v2/documents/by-file`.

use super::{insert_non_blank, non_blank, parse_params, PlatformContext};
use crate::error::ToolError;
use crate::schema::schema_of;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use storm_gateway::{AuthMode, FilePayload, RemoteCallSpec};
use storm_sandbox::decode_base64;

const DOCUMENTS_ENDPOINT: &str = "/api/v2/documents/by-file";
const AUTH: AuthMode = AuthMode::BearerToken;
const DEFAULT_FILE_NAME: &str = "uploaded_file";
const FILE_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadDocumentParams {
    /// Bucket that stores the trained document.
    pub bucket_id: String,
    /// Path of a file in the server's file root. Takes precedence over file_base64.
    pub file_path: Option<String>,
    /// Base64-encoded file content.
    pub file_base64: Option<String>,
    /// File name to upload file_base64 under (e.g. foo.pdf).
    pub file_name: Option<String>,
    /// Webhook that receives the result.
    pub webhook_url: Option<String>,
}

pub struct UploadDocumentTool {
    ctx: Arc<PlatformContext>,
}

impl UploadDocumentTool {
    pub fn new(ctx: Arc<PlatformContext>) -> Self {
        Self { ctx }
    }

    async fn load_file(&self, params: &UploadDocumentParams) -> Result<(String, Vec<u8>), ToolError> {
        if let Some(path) = non_blank(params.file_path.clone()) {
            let files = self.ctx.files.as_ref().ok_or_else(|| {
                ToolError::InvalidArgument(
                    "file_path needs a configured files root; send file_base64 instead".to_string(),
                )
            })?;
            let bytes = files.read_bytes(&path).await?;
            let file_name = Path::new(&path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
            return Ok((file_name, bytes));
        }

        if let Some(content) = non_blank(params.file_base64.clone()) {
            let bytes = decode_base64(&content)?;
            let file_name =
                non_blank(params.file_name.clone()).unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
            return Ok((file_name, bytes));
        }

        Err(ToolError::MissingRequiredArgument(
            "file_path or file_base64".to_string(),
        ))
    }
}

#[async_trait]
impl Tool for UploadDocumentTool {
    fn name(&self) -> &str {
        "upload_document_by_file"
    }
    fn description(&self) -> &str {
        "Upload a document to a bucket via POST /api/v2/documents/by-file (multipart). \
         Provide either file_path or file_base64."
    }
    fn input_schema(&self) -> Value {
        self.ctx
            .credentials
            .decorate_schema(AUTH, schema_of::<UploadDocumentParams>())
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let credential = self.ctx.credentials.resolve(AUTH, &args)?;
        let params: UploadDocumentParams = parse_params(args)?;
        let (file_name, bytes) = self.load_file(&params).await?;

        let mut fields = Map::new();
        fields.insert(
            "bucketId".to_string(),
            Value::String(params.bucket_id.trim().to_string()),
        );
        insert_non_blank(&mut fields, "webhookUrl", params.webhook_url);

        tracing::debug!(file = %file_name, bytes = bytes.len(), "uploading document");
        let spec = RemoteCallSpec::post(DOCUMENTS_ENDPOINT, AUTH, credential)
            .with_body(fields)
            .with_file(FilePayload {
                field_name: self.ctx.upload_field.clone(),
                file_name,
                bytes,
                content_type: FILE_CONTENT_TYPE.to_string(),
            });
        Ok(ToolOutput::Json(self.ctx.gateway.invoke(spec).await?))
    }
}
