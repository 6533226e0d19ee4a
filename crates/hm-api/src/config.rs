use std::path::PathBuf;

use serde::Deserialize;

use hm_srs::DEFAULT_QUEUE_LIMIT;

/// Prefix of every configuration variable, e.g. `HM_PORT`
pub const ENV_PREFIX: &str = "HM_";

/// Deployment environment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    /// JSON array of vocabulary items
    pub vocabulary_path: PathBuf,
    /// Optional review history snapshot to start from
    #[serde(default)]
    pub history_path: Option<PathBuf>,
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,
    /// Comma-separated list of origins allowed by CORS
    #[serde(default)]
    pub allowed_origins: Option<String>,
}

const fn default_port() -> u16 {
    3000
}

const fn default_queue_limit() -> usize {
    DEFAULT_QUEUE_LIMIT
}

impl ApiConfig {
    /// Read the configuration from `HM_*` environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }

    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}
