//! HTTP implementation of [`ProductApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use producthub_core::{FilterState, Product, ProductId, ProductInput, ValidCredentials};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{ApiError, ApiOperation, AuthRequest, AuthResponse, MessageBody, ProductApi};
use crate::services::SessionToken;

/// Confirmation shown when a delete response carries no message.
const DELETED_FALLBACK: &str = "Product deleted";

/// ProductHub catalog API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ProductHubClient {
    inner: Arc<ProductHubClientInner>,
}

struct ProductHubClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ProductHubClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ProductHubClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &SessionToken,
        op: ApiOperation,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(token.secret().expose_secret())
            .send()
            .await?;
        handle_response(response, op).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        request: reqwest::RequestBuilder,
        body: &B,
        op: ApiOperation,
    ) -> Result<T, ApiError> {
        let response = request.json(body).send().await?;
        handle_response(response, op).await
    }

    async fn authenticate(
        &self,
        path: &str,
        credentials: &ValidCredentials,
        op: ApiOperation,
    ) -> Result<SessionToken, ApiError> {
        let body = AuthRequest {
            email: credentials.email.as_str(),
            password: &credentials.password,
        };
        let response: AuthResponse = self
            .send_json(self.inner.client.post(self.url(path)), &body, op)
            .await?;
        Ok(SessionToken::new(response.token))
    }
}

#[async_trait]
impl ProductApi for ProductHubClient {
    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn login(&self, credentials: &ValidCredentials) -> Result<SessionToken, ApiError> {
        self.authenticate("/api/auth/login", credentials, ApiOperation::Login)
            .await
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn signup(&self, credentials: &ValidCredentials) -> Result<SessionToken, ApiError> {
        self.authenticate("/api/auth/signup", credentials, ApiOperation::Signup)
            .await
    }

    #[instrument(skip_all)]
    async fn list_products(&self, token: &SessionToken) -> Result<Vec<Product>, ApiError> {
        self.get(&self.url("/api/products"), token, ApiOperation::List)
            .await
    }

    #[instrument(skip_all, fields(query = %filters.to_query()))]
    async fn filter_products(
        &self,
        filters: &FilterState,
        token: &SessionToken,
    ) -> Result<Vec<Product>, ApiError> {
        let url = self.url(&format!("/api/products/filter?{}", filters.to_query()));
        self.get(&url, token, ApiOperation::Filter).await
    }

    #[instrument(skip_all, fields(name = %input.name))]
    async fn create_product(
        &self,
        input: &ProductInput,
        token: &SessionToken,
    ) -> Result<Product, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/products"))
            .bearer_auth(token.secret().expose_secret());
        self.send_json(request, input, ApiOperation::Create).await
    }

    #[instrument(skip_all, fields(product_id = %id))]
    async fn update_product(
        &self,
        id: ProductId,
        product: &Product,
        token: &SessionToken,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("/api/products/{id}")))
            .bearer_auth(token.secret().expose_secret())
            .json(product)
            .send()
            .await?;

        // The body of a successful update is not used.
        if response.status().is_success() {
            return Ok(());
        }
        Err(parse_error(response, ApiOperation::Update).await)
    }

    #[instrument(skip_all, fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId, token: &SessionToken) -> Result<String, ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("/api/products/{id}")))
            .bearer_auth(token.secret().expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(parse_error(response, ApiOperation::Delete).await);
        }

        let body = response.text().await?;
        Ok(MessageBody::extract(&body).unwrap_or_else(|| DELETED_FALLBACK.to_string()))
    }
}

/// Decode a success body or turn the response into an [`ApiError`].
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
    op: ApiOperation,
) -> Result<T, ApiError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response, op).await)
}

/// Build an error from a non-success response, preferring the body's `message`.
async fn parse_error(response: reqwest::Response, op: ApiOperation) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let message = MessageBody::extract(&body).unwrap_or_else(|| op.default_error().to_string());
    tracing::warn!(status, operation = ?op, %message, "Catalog API error");

    ApiError::Api { status, message }
}

impl std::fmt::Debug for ProductHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductHubClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}
