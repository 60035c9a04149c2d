//! send_nonstream_chat — ask a question through `/api/v2/answer`.

use super::{insert_non_blank, parse_params, PlatformContext};
use crate::error::ToolError;
use crate::schema::schema_of;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use storm_gateway::{AuthMode, RemoteCallSpec};

const ANSWER_ENDPOINT: &str = "/api/v2/answer";
const AUTH: AuthMode = AuthMode::ApiKeyHeader;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendChatParams {
    /// Question text.
    pub question: String,
    /// Buckets to answer from.
    pub bucket_ids: Option<Vec<String>>,
    /// Thread to post the question to.
    pub thread_id: Option<String>,
    /// Webhook that receives the result.
    pub webhook_url: Option<String>,
}

pub struct SendChatTool {
    ctx: Arc<PlatformContext>,
}

impl SendChatTool {
    pub fn new(ctx: Arc<PlatformContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SendChatTool {
    fn name(&self) -> &str {
        "send_nonstream_chat"
    }
    fn description(&self) -> &str {
        "Ask a question via POST /api/v2/answer (non-stream) and return the answer. \
         Authenticates with the storm-api-key header."
    }
    fn input_schema(&self) -> Value {
        self.ctx
            .credentials
            .decorate_schema(AUTH, schema_of::<SendChatParams>())
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let credential = self.ctx.credentials.resolve(AUTH, &args)?;
        let params: SendChatParams = parse_params(args)?;

        let mut body = Map::new();
        body.insert(
            "question".to_string(),
            Value::String(params.question.trim().to_string()),
        );
        if let Some(bucket_ids) = params.bucket_ids.filter(|ids| !ids.is_empty()) {
            body.insert("bucketIds".to_string(), serde_json::json!(bucket_ids));
        }
        insert_non_blank(&mut body, "threadId", params.thread_id);
        insert_non_blank(&mut body, "webhookUrl", params.webhook_url);

        let spec = RemoteCallSpec::post(ANSWER_ENDPOINT, AUTH, credential).with_body(body);
        Ok(ToolOutput::Json(self.ctx.gateway.invoke(spec).await?))
    }
}
