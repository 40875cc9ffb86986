//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::MemoryStore;

use crate::api::{ApiError, ProductApi, ProductHubClient};
use crate::config::DashboardConfig;
use crate::live::LiveHub;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    api: Arc<dyn ProductApi>,
    live: LiveHub,
    sessions: Arc<MemoryStore>,
}

impl AppState {
    /// Build state with an HTTP client for the configured catalog API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: DashboardConfig) -> Result<Self, ApiError> {
        let client = ProductHubClient::new(&config.api_url, config.request_timeout)?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Build state around any [`ProductApi`] implementation.
    #[must_use]
    pub fn with_api(config: DashboardConfig, api: Arc<dyn ProductApi>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                live: LiveHub::new(),
                sessions: Arc::new(MemoryStore::default()),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn ProductApi> {
        Arc::clone(&self.inner.api)
    }

    #[must_use]
    pub fn live(&self) -> &LiveHub {
        &self.inner.live
    }

    /// Store backing every visitor session.
    #[must_use]
    pub fn sessions(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.inner.sessions)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("live", &self.inner.live)
            .finish_non_exhaustive()
    }
}
