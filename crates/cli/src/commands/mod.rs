//! CLI command implementations.

pub mod auth;
pub mod products;

use std::io::Write;
use std::sync::Arc;

use producthub_core::FormErrors;
use producthub_dashboard::api::{ApiError, ProductApi, ProductHubClient};
use producthub_dashboard::config::ConfigError;
use producthub_dashboard::services::{SessionContext, StorageError};
use thiserror::Error;

use crate::config::CliConfig;
use crate::storage::FileStorage;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog API refused or failed the request.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// No stored credential.
    #[error("Unauthorized, please login.")]
    NotLoggedIn,

    /// Arguments failed validation.
    #[error("Invalid input: {}", describe(.0))]
    Invalid(FormErrors),

    /// Anything else the user got wrong.
    #[error("{0}")]
    Usage(String),
}

fn describe(errors: &FormErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// What every command needs: the API client and this machine's session.
pub struct Client {
    pub api: Arc<dyn ProductApi>,
    pub context: SessionContext,
}

impl Client {
    /// Build the client from configuration and load the stored session.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the HTTP client fails to build or the storage
    /// file cannot be read.
    pub async fn connect(config: &CliConfig) -> Result<Self, CliError> {
        let api = ProductHubClient::new(&config.api_url, config.request_timeout)?;
        let storage = FileStorage::new(&config.storage_path);
        tracing::debug!(path = %storage.path().display(), "Using storage file");

        Ok(Self {
            api: Arc::new(api),
            context: SessionContext::load(Arc::new(storage)).await?,
        })
    }
}

/// Write one line to stdout.
fn emit(line: impl std::fmt::Display) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
}
