use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("FACE_MATCH_SERVER").separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

/// Face search provider settings as found in the environment.
///
/// Every field is optional here so the server can start without them;
/// completeness is checked per request by [`ProviderConfig::resolve`].
#[derive(Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// `AWS_REGION`
    #[serde(default)]
    pub region: Option<String>,

    /// `AWS_ACCESS_KEY_ID`
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// `AWS_SECRET_ACCESS_KEY`
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// `AWS_SESSION_TOKEN`, only needed for temporary credentials
    #[serde(default)]
    pub session_token: Option<String>,

    /// `FACE_COLLECTION_ID`
    #[serde(default)]
    pub collection_id: Option<String>,
}

/// Complete provider settings, ready to build a client from.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub collection_id: String,
}

impl ProviderConfig {
    /// Read provider settings from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(None)
    }

    /// Read provider settings from an explicit variable map instead of the
    /// process environment when `vars` is `Some`.
    pub fn from_vars(vars: Option<config::Map<String, String>>) -> anyhow::Result<Self> {
        let aws = config::Environment::with_prefix("AWS")
            .prefix_separator("_")
            .ignore_empty(true)
            .source(vars.clone());
        let face = config::Environment::with_prefix("FACE")
            .prefix_separator("_")
            .ignore_empty(true)
            .source(vars);

        let config = config::Config::builder()
            .add_source(aws)
            .add_source(face)
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Names of the required variables that are unset or blank.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("AWS_REGION", &self.region),
            ("AWS_ACCESS_KEY_ID", &self.access_key_id),
            ("AWS_SECRET_ACCESS_KEY", &self.secret_access_key),
            ("FACE_COLLECTION_ID", &self.collection_id),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(key, _)| key)
        .collect()
    }

    /// Check that every required value is present.
    pub fn resolve(&self) -> ServerResult<ProviderSettings> {
        match (
            present(&self.region),
            present(&self.access_key_id),
            present(&self.secret_access_key),
            present(&self.collection_id),
        ) {
            (Some(region), Some(access_key_id), Some(secret_access_key), Some(collection_id)) => {
                Ok(ProviderSettings {
                    region: region.to_string(),
                    access_key_id: access_key_id.to_string(),
                    secret_access_key: secret_access_key.to_string(),
                    session_token: present(&self.session_token).map(str::to_string),
                    collection_id: collection_id.to_string(),
                })
            }
            _ => Err(ServerError::Config(format!(
                "missing provider settings: {}",
                self.missing_keys().join(", ")
            ))),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// Secrets must never reach the logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "<set>"))
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<set>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<set>"))
            .field("collection_id", &self.collection_id)
            .finish()
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("region", &self.region)
            .field("collection_id", &self.collection_id)
            .finish_non_exhaustive()
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
