use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storm_gateway::{GatewayConfig, DEFAULT_API_KEY_HEADER, DEFAULT_BASE_URL};
use storm_tools::builtin::DEFAULT_UPLOAD_FIELD;
use storm_tools::{CredentialSource, Credentials};

pub const ENV_API_KEY: &str = "STORM_API_KEY";
pub const ENV_BEARER_TOKEN: &str = "STORM_BEARER_TOKEN";
pub const ENV_BASE_URL: &str = "STORM_BASE_URL";

/// Serialized settings from ~/.storm/config.json
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub api_key_header: String,
    /// Multipart field name for document uploads.
    pub upload_field: String,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub credential_source: CredentialSource,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    /// Sandbox root for the file tools; unset disables them.
    pub files_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
            request_timeout_secs: 30,
            upload_timeout_secs: 60,
            credential_source: CredentialSource::Environment,
            api_key: None,
            bearer_token: None,
            files_root: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key_header", &self.api_key_header)
            .field("upload_field", &self.upload_field)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field("credential_source", &self.credential_source)
            .field("api_key", &redact(&self.api_key))
            .field("bearer_token", &redact(&self.bearer_token))
            .field("files_root", &self.files_root)
            .finish()
    }
}

impl Config {
    /// Overlay `STORM_*` variables. `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = read(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(token) = read(ENV_BEARER_TOKEN) {
            self.bearer_token = Some(token);
        }
        if let Some(url) = read(ENV_BASE_URL) {
            self.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.upload_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "upload_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.upload_field.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "upload_field",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key_header: self.api_key_header.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
        }
    }

    /// Credentials for the configured source. Stored values are ignored in
    /// `arguments` mode.
    pub fn credentials(&self) -> Credentials {
        match self.credential_source {
            CredentialSource::Environment => {
                Credentials::configured(self.api_key.clone(), self.bearer_token.clone())
            }
            CredentialSource::Arguments => Credentials::per_call(),
        }
    }
}

/// Helper struct for storing the location to read/write global settings
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".storm");
        path.push("config.json");
        Self { path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved config, or defaults when no file exists yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config =
            serde_json::from_str(r#"{"bearer_token":"t","files_root":"/srv/files"}"#).unwrap();
        assert_eq!(parsed.bearer_token.as_deref(), Some("t"));
        assert_eq!(parsed.files_root, Some(PathBuf::from("/srv/files")));
        assert_eq!(parsed.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.upload_field, "file");
        assert_eq!(parsed.request_timeout_secs, 30);
        assert_eq!(parsed.upload_timeout_secs, 60);
        assert_eq!(parsed.credential_source, CredentialSource::Environment);
    }

    #[test]
    fn test_credential_source_spelling() {
        let parsed: Config = serde_json::from_str(r#"{"credential_source":"arguments"}"#).unwrap();
        assert_eq!(parsed.credential_source, CredentialSource::Arguments);
        assert_eq!(parsed.credentials(), Credentials::per_call());
    }

    #[test]
    fn test_apply_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "env-key"),
            (ENV_BEARER_TOKEN, "  "),
            (ENV_BASE_URL, "http://localhost:9000/"),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            bearer_token: Some("file-token".into()),
            ..Default::default()
        };
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.bearer_token.as_deref(), Some("file-token"));
        assert_eq!(config.gateway_config().base_url, "http://localhost:9000");
    }

    #[test]
    fn test_store_load_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("nested/config.json"));
        assert_eq!(store.load().unwrap(), Config::default());

        let config = Config {
            upload_field: "document".into(),
            upload_timeout_secs: 120,
            ..Default::default()
        };
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(store.path(), serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        let err = ConfigStore::with_path(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "request_timeout_secs", .. })
        ));
        assert!(Config::default().validate().is_ok());

        let config = Config {
            upload_field: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "upload_field", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            api_key: Some("sk-very-secret".into()),
            ..Default::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("sk-very-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
