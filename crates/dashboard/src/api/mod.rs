//! ProductHub catalog API.
//!
//! [`ProductApi`] is the seam between the dashboard and the remote catalog:
//! the live pages and the CLI talk to it, the binary wires in
//! [`ProductHubClient`], and tests substitute in-memory fakes.
//!
//! # API Reference
//!
//! - Base URL: `https://producthub-server.onrender.com` (configurable)
//! - Authentication: `Authorization: Bearer <token>` from login/signup
//! - Errors: JSON body with a `message` field

mod client;
mod types;

pub use client::ProductHubClient;
pub use types::*;

use async_trait::async_trait;
use producthub_core::{FilterState, Product, ProductId, ProductInput, ValidCredentials};
use thiserror::Error;

use crate::services::SessionToken;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, body read).
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Text surfaced to the user in a notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => "The catalog service timed out".to_string(),
            Self::Http(_) => "Could not reach the catalog service".to_string(),
            Self::Parse(_) => "Unexpected response from the catalog service".to_string(),
        }
    }

    /// HTTP status from the API, if it answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote operations, used to pick a default error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    Login,
    Signup,
    List,
    Filter,
    Create,
    Update,
    Delete,
}

impl ApiOperation {
    /// Message used when an error response carries no `message`.
    #[must_use]
    pub const fn default_error(self) -> &'static str {
        match self {
            Self::Login => "Invalid credentials",
            Self::Signup => "Signup failed. Try again.",
            Self::List => "Failed to fetch products",
            Self::Filter => "Failed to fetch filtered products",
            Self::Create => "Failed to create product",
            Self::Update => "Failed to update product",
            Self::Delete => "Failed to delete product",
        }
    }
}

/// Catalog API operations.
#[async_trait]
pub trait ProductApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &ValidCredentials) -> Result<SessionToken, ApiError>;

    /// Register and receive a bearer token.
    async fn signup(&self, credentials: &ValidCredentials) -> Result<SessionToken, ApiError>;

    /// Every product in the catalog.
    async fn list_products(&self, token: &SessionToken) -> Result<Vec<Product>, ApiError>;

    /// Products matching the non-empty entries of `filters`.
    async fn filter_products(
        &self,
        filters: &FilterState,
        token: &SessionToken,
    ) -> Result<Vec<Product>, ApiError>;

    /// Create a product; returns the record with server-assigned ids.
    async fn create_product(
        &self,
        input: &ProductInput,
        token: &SessionToken,
    ) -> Result<Product, ApiError>;

    /// Replace the product `id` with `product`.
    async fn update_product(
        &self,
        id: ProductId,
        product: &Product,
        token: &SessionToken,
    ) -> Result<(), ApiError>;

    /// Delete the product `id`; returns the server's confirmation message.
    async fn delete_product(&self, id: ProductId, token: &SessionToken) -> Result<String, ApiError>;
}
