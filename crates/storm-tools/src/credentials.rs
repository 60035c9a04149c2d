//! Credential injection for the remote tools.

use crate::error::ToolError;
use crate::schema::with_required_string;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use storm_gateway::AuthMode;

/// Where credentials come from. Exactly one source is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Values configured at startup.
    #[default]
    Environment,
    /// Values supplied by the caller on every call.
    Arguments,
}

/// Credentials handed to the platform tools at construction.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub source: CredentialSource,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl Credentials {
    /// Configured credentials; schemas carry no credential fields.
    pub fn configured(api_key: Option<String>, bearer_token: Option<String>) -> Self {
        Self {
            source: CredentialSource::Environment,
            api_key,
            bearer_token,
        }
    }

    /// Caller-supplied credentials; schemas require `api_key` / `bearer_token`.
    pub fn per_call() -> Self {
        Self {
            source: CredentialSource::Arguments,
            api_key: None,
            bearer_token: None,
        }
    }

    /// Argument name that carries the credential for `auth`.
    pub fn argument_name(auth: AuthMode) -> &'static str {
        match auth {
            AuthMode::ApiKeyHeader => "api_key",
            AuthMode::BearerToken => "bearer_token",
        }
    }

    /// Extend a tool schema with the credential argument when callers supply it.
    pub fn decorate_schema(&self, auth: AuthMode, schema: Value) -> Value {
        match self.source {
            CredentialSource::Environment => schema,
            CredentialSource::Arguments => {
                let description = match auth {
                    AuthMode::ApiKeyHeader => "API key sent in the storm-api-key header",
                    AuthMode::BearerToken => "Bearer token used for authentication",
                };
                with_required_string(schema, Self::argument_name(auth), description)
            }
        }
    }

    /// Pick the single credential for one call.
    pub fn resolve(&self, auth: AuthMode, args: &Map<String, Value>) -> Result<String, ToolError> {
        match self.source {
            CredentialSource::Environment => {
                let (value, label) = match auth {
                    AuthMode::ApiKeyHeader => (&self.api_key, "no API key configured"),
                    AuthMode::BearerToken => (&self.bearer_token, "no bearer token configured"),
                };
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| ToolError::MissingCredential(label.to_string()))
            }
            CredentialSource::Arguments => {
                let name = Self::argument_name(auth);
                args.get(name)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| ToolError::MissingRequiredArgument(name.to_string()))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("source", &self.source)
            .field("api_key", &redact(&self.api_key))
            .field("bearer_token", &redact(&self.bearer_token))
            .finish()
    }
}
