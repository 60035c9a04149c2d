//! list_agents / list_buckets — paginated GET listings with a bearer token.

use super::{parse_params, PlatformContext};
use crate::error::ToolError;
use crate::schema::schema_of;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use storm_gateway::{AuthMode, RemoteCallSpec};

const AGENTS_ENDPOINT: &str = "/api/v2/agents";
const BUCKETS_ENDPOINT: &str = "/api/v2/buckets";
const AUTH: AuthMode = AuthMode::BearerToken;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListAgentsParams {
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListBucketsParams {
    /// Agent whose buckets to list.
    pub agent_id: String,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub size: Option<u32>,
}

pub struct ListAgentsTool {
    ctx: Arc<PlatformContext>,
}

impl ListAgentsTool {
    pub fn new(ctx: Arc<PlatformContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListAgentsTool {
    fn name(&self) -> &str {
        "list_agents"
    }
    fn description(&self) -> &str {
        "List the agents visible to the bearer token via GET /api/v2/agents."
    }
    fn input_schema(&self) -> Value {
        self.ctx
            .credentials
            .decorate_schema(AUTH, schema_of::<ListAgentsParams>())
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let credential = self.ctx.credentials.resolve(AUTH, &args)?;
        let params: ListAgentsParams = parse_params(args)?;

        let spec = RemoteCallSpec::get(AGENTS_ENDPOINT, AUTH, credential)
            .with_optional_param("page", params.page)
            .with_optional_param("size", params.size);
        Ok(ToolOutput::Json(self.ctx.gateway.invoke(spec).await?))
    }
}

pub struct ListBucketsTool {
    ctx: Arc<PlatformContext>,
}

impl ListBucketsTool {
    pub fn new(ctx: Arc<PlatformContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListBucketsTool {
    fn name(&self) -> &str {
        "list_buckets"
    }
    fn description(&self) -> &str {
        "List the buckets registered to an agent via GET /api/v2/buckets."
    }
    fn input_schema(&self) -> Value {
        self.ctx
            .credentials
            .decorate_schema(AUTH, schema_of::<ListBucketsParams>())
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let credential = self.ctx.credentials.resolve(AUTH, &args)?;
        let params: ListBucketsParams = parse_params(args)?;

        let spec = RemoteCallSpec::get(BUCKETS_ENDPOINT, AUTH, credential)
            .with_param("agentId", params.agent_id.trim())
            .with_optional_param("page", params.page)
            .with_optional_param("size", params.size);
        Ok(ToolOutput::Json(self.ctx.gateway.invoke(spec).await?))
    }
}
