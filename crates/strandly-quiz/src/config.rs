use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://strandly-backend.onrender.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_URL: &str = "STRANDLY_API_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "STRANDLY_REQUEST_TIMEOUT_SECS";
pub const ENV_STORAGE_DIR: &str = "STRANDLY_STORAGE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid api base url '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("no storage directory available on this platform")]
    NoStorageDir,
}

/// How the payment hand-off obtains something the payment UI can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPolicy {
    /// Try an embedded payment intent first, then fall back to a hosted checkout session.
    #[default]
    IntentThenCheckout,
    CheckoutOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub amount_cents: u32,
    pub currency: String,
    pub display_price: String,
    pub checkout_policy: CheckoutPolicy,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            amount_cents: 2900,
            currency: "USD".to_string(),
            display_price: "$29.00".to_string(),
            checkout_policy: CheckoutPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub progress_ttl_hours: u32,
    pub results_ttl_days: u32,
    pub storage_dir: Option<PathBuf>,
    pub payment: PaymentConfig,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            progress_ttl_hours: 24,
            results_ttl_days: 7,
            storage_dir: None,
            payment: PaymentConfig::default(),
        }
    }
}

impl QuizConfig {
    /// Reads `path` when given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|key| env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded quiz config");
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: QuizConfig = toml::from_str(raw)?;
        config.validated()
    }

    /// Applies `STRANDLY_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            self.api_base_url = url;
        }
        if let Some(raw) = non_empty(lookup(ENV_REQUEST_TIMEOUT_SECS)) {
            self.request_timeout_secs =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
        }
        if let Some(dir) = non_empty(lookup(ENV_STORAGE_DIR)) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.api_base_url()?;
        self.request_timeout_secs = self
            .request_timeout_secs
            .clamp(1, MAX_REQUEST_TIMEOUT_SECS);
        Ok(self)
    }

    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_base_url).map_err(|source| ConfigError::InvalidUrl {
            value: self.api_base_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn progress_ttl(&self) -> time::Duration {
        time::Duration::hours(i64::from(self.progress_ttl_hours))
    }

    pub fn results_ttl(&self) -> time::Duration {
        time::Duration::days(i64::from(self.results_ttl_days))
    }

    /// Configured storage directory, or the platform data directory.
    pub fn resolve_storage_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("app", "Strandly", "strandly-quiz")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoStorageDir)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
