//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `PRODUCTHUB_API_URL` - Catalog API base URL (default: <https://producthub-server.onrender.com>)
//! - `PRODUCTHUB_STORAGE` - Credential and filter file (default: `$HOME/.producthub.json`)

use std::path::PathBuf;
use std::time::Duration;

use producthub_dashboard::config::{ConfigError, DEFAULT_API_URL};
use url::Url;

/// File name used under `$HOME` when `PRODUCTHUB_STORAGE` is unset.
const STORAGE_FILE: &str = ".producthub.json";

/// Catalog API request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_url: Url,
    pub storage_path: PathBuf,
    pub request_timeout: Duration,
}

impl CliConfig {
    /// Load configuration from environment variables and `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PRODUCTHUB_API_URL` is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let raw = std::env::var("PRODUCTHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("PRODUCTHUB_API_URL".to_string(), e.to_string()))?;

        let storage_path = std::env::var_os("PRODUCTHUB_STORAGE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_storage_path(std::env::var_os("HOME").map(PathBuf::from)));

        Ok(Self {
            api_url,
            storage_path,
            request_timeout: REQUEST_TIMEOUT,
        })
    }
}

fn default_storage_path(home: Option<PathBuf>) -> PathBuf {
    home.map_or_else(|| PathBuf::from(STORAGE_FILE), |home| home.join(STORAGE_FILE))
}
