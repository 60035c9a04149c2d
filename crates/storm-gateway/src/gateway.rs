//! The remote gateway: one outbound HTTP request per call.

use crate::error::GatewayError;
use crate::types::{AuthMode, FilePayload, GatewayConfig, RemoteCallSpec};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Map, Value};

/// HTTP client for the Storm platform API.
///
/// Holds only the connection pool and immutable settings, so it can be shared
/// across concurrent calls.
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    client: Client,
    config: GatewayConfig,
}

impl RemoteGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("storm-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send the call described by `spec` and decode the response body.
    ///
    /// Non-JSON success bodies are wrapped as `{"status":"success","data":…}`.
    /// Any status >= 400 fails with [`GatewayError::RemoteApi`]. No retries.
    pub async fn invoke(&self, spec: RemoteCallSpec) -> Result<Value, GatewayError> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            spec.endpoint
        );
        let method = spec.method.clone();
        let endpoint = spec.endpoint.clone();

        let request = self.build_request(&url, spec)?;
        tracing::debug!(%method, %endpoint, "calling remote api");

        let log_transport = |err: reqwest::Error| {
            let err = GatewayError::Transport(err);
            if err.is_timeout() {
                tracing::warn!(%method, %endpoint, "remote api timed out");
            } else {
                tracing::warn!(%method, %endpoint, error = %err, "remote api transport failure");
            }
            err
        };

        let response = request.send().await.map_err(log_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(log_transport)?;
        tracing::debug!(%method, %endpoint, status = status.as_u16(), "remote api responded");

        if status.as_u16() >= 400 {
            return Err(GatewayError::RemoteApi {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(decode_body(&text))
    }

    fn build_request(&self, url: &str, spec: RemoteCallSpec) -> Result<RequestBuilder, GatewayError> {
        let RemoteCallSpec {
            method,
            auth,
            credential,
            params,
            body,
            file,
            ..
        } = spec;

        let request = if method == Method::GET {
            self.client
                .get(url)
                .query(&params)
                .timeout(self.config.request_timeout)
        } else if method == Method::DELETE {
            self.client
                .delete(url)
                .query(&params)
                .timeout(self.config.request_timeout)
        } else if method == Method::POST {
            let request = self.client.post(url).query(&params);
            match (file, body) {
                (Some(file), body) => request
                    .multipart(multipart_form(body, file)?)
                    .timeout(self.config.upload_timeout),
                (None, Some(body)) => request.json(&body).timeout(self.config.request_timeout),
                (None, None) => request.timeout(self.config.request_timeout),
            }
        } else {
            return Err(GatewayError::UnsupportedMethod(method.to_string()));
        };

        Ok(self.authorize(request, auth, &credential))
    }

    fn authorize(&self, request: RequestBuilder, auth: AuthMode, credential: &str) -> RequestBuilder {
        match auth {
            AuthMode::ApiKeyHeader => request.header(self.config.api_key_header.as_str(), credential),
            AuthMode::BearerToken => request.bearer_auth(credential),
        }
    }
}

/// Parse a response body as JSON, wrapping plain text as a success envelope.
pub fn decode_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| {
        json!({
            "status": "success",
            "data": text,
        })
    })
}

fn multipart_form(fields: Option<Map<String, Value>>, file: FilePayload) -> Result<Form, GatewayError> {
    let mut form = Form::new();
    for (key, value) in fields.into_iter().flatten() {
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        form = form.text(key, text);
    }

    let part = Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid content type: {e}")))?;
    Ok(form.part(file.field_name, part))
}
