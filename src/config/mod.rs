use garde::Validate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind_addr")]
    #[garde(length(min = 1))]
    pub bind_addr: String,

    /// Maximum simultaneous verification calls per job.
    #[serde(default = "default_max_concurrency")]
    #[garde(range(min = 1, max = 512))]
    pub max_concurrency: usize,

    /// Request body limit for CSV uploads, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    #[garde(range(min = 1))]
    pub max_upload_bytes: usize,

    /// Timeout for each outbound probe request.
    #[serde(default = "default_verify_timeout_secs")]
    #[garde(range(min = 1, max = 600))]
    pub verify_timeout_secs: u64,

    /// Base URL of the remote reachability probe service. Deep checks are
    /// unavailable when unset.
    #[serde(default)]
    #[garde(skip)]
    pub reachability_api_url: Option<String>,

    /// Base URL for gravatar lookups.
    #[serde(default = "default_gravatar_base_url")]
    #[garde(length(min = 1))]
    pub gravatar_base_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_concurrency() -> usize {
    10
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

fn default_verify_timeout_secs() -> u64 {
    30
}

fn default_gravatar_base_url() -> String {
    "https://gravatar.com".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit key/value pairs (keys in SCREAMING_SNAKE_CASE).
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: AppConfig = envy::from_iter(vars)?;
        config.validate().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
