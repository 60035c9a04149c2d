//! Request description types for the remote gateway.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Production base URL of the Storm platform API.
pub const DEFAULT_BASE_URL: &str = "https://live-stargate.sionic.im";

/// Header carrying the API key in [`AuthMode::ApiKeyHeader`] mode.
pub const DEFAULT_API_KEY_HEADER: &str = "storm-api-key";

/// Credential transport scheme, fixed per tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Custom API key header.
    ApiKeyHeader,
    /// `Authorization: Bearer <token>`.
    BearerToken,
}

/// Settings shared by every outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Scheme and host, without trailing path.
    pub base_url: String,
    /// Header name used for [`AuthMode::ApiKeyHeader`].
    pub api_key_header: String,
    /// Timeout for JSON and query-string calls.
    pub request_timeout: Duration,
    /// Timeout for multipart uploads.
    pub upload_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
        }
    }
}

/// File attached to a multipart POST.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub field_name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// One outbound call. Built per tool invocation and dropped afterwards.
#[derive(Clone)]
pub struct RemoteCallSpec {
    pub method: Method,
    /// Path below the base URL, e.g. `/api/v2/agents`.
    pub endpoint: String,
    pub auth: AuthMode,
    pub credential: String,
    /// Query string parameters.
    pub params: BTreeMap<String, String>,
    /// JSON body, or text form fields when `file` is set.
    pub body: Option<Map<String, Value>>,
    pub file: Option<FilePayload>,
}

impl RemoteCallSpec {
    pub fn new(
        method: Method,
        endpoint: impl Into<String>,
        auth: AuthMode,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            auth,
            credential: credential.into(),
            params: BTreeMap::new(),
            body: None,
            file: None,
        }
    }

    pub fn get(endpoint: impl Into<String>, auth: AuthMode, credential: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint, auth, credential)
    }

    pub fn post(endpoint: impl Into<String>, auth: AuthMode, credential: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint, auth, credential)
    }

    pub fn delete(
        endpoint: impl Into<String>,
        auth: AuthMode,
        credential: impl Into<String>,
    ) -> Self {
        Self::new(Method::DELETE, endpoint, auth, credential)
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add a query parameter when `value` is set.
    pub fn with_optional_param<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with_param(key, value),
            None => self,
        }
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_file(mut self, file: FilePayload) -> Self {
        self.file = Some(file);
        self
    }
}

impl fmt::Debug for RemoteCallSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCallSpec")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth)
            .field("credential", &"<redacted>")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("file", &self.file)
            .finish()
    }
}
