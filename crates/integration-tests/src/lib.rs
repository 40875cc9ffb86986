//! End-to-end test support for the ProductHub dashboard.
//!
//! Every test gets its own world: an in-process fake catalog API and a
//! dashboard pointed at it, both bound to ephemeral ports, plus a
//! cookie-keeping HTTP client that does not follow redirects.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_health() {
//!     let ctx = TestContext::start().await;
//!     let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
//!     assert_eq!(resp.status(), 200);
//! }
//! ```

pub mod fake_api;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use producthub_dashboard::config::DashboardConfig;
use producthub_dashboard::routes;
use producthub_dashboard::state::AppState;
use reqwest::{Client, Response, StatusCode};
use url::Url;

pub use fake_api::{FakeApi, SEED_EMAIL, SEED_PASSWORD};

/// Filter debounce used by the test dashboard.
pub const TEST_DEBOUNCE: Duration = Duration::from_millis(50);

/// How long to wait for the live page to reach an expected state.
const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// A fake API, a dashboard and a browser-like client.
pub struct TestContext {
    pub api: FakeApi,
    pub api_url: Url,
    pub dashboard_url: String,
    pub client: Client,
}

impl TestContext {
    /// Start a seeded fake API and a dashboard in front of it.
    pub async fn start() -> Self {
        let api = FakeApi::seeded();
        let api_addr = serve(api.router()).await;
        let api_url = Url::parse(&format!("http://{api_addr}")).expect("fake API url");

        let mut config = DashboardConfig::local(api_url.clone());
        config.filter_debounce = TEST_DEBOUNCE;
        let state = AppState::new(config).expect("dashboard state");
        let dashboard_addr = serve(routes::app(state)).await;

        Self {
            api,
            api_url,
            dashboard_url: format!("http://{dashboard_addr}"),
            client: browser(),
        }
    }

    /// Absolute dashboard URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.dashboard_url)
    }

    /// Sign in with the seeded account.
    pub async fn sign_in(&self) -> Response {
        self.client
            .post(self.url("/sign-in"))
            .form(&[("email", SEED_EMAIL), ("password", SEED_PASSWORD)])
            .send()
            .await
            .expect("sign-in request")
    }

    /// Open the products page and return its live page id and HTML.
    pub async fn open_products(&self) -> (String, String) {
        let response = self
            .client
            .get(self.url("/products"))
            .send()
            .await
            .expect("products request");
        assert_eq!(response.status(), StatusCode::OK);

        let html = response.text().await.expect("products body");
        let page_id = page_id(&html).expect("page id in products page");
        (page_id, html)
    }

    /// URL of a live page endpoint.
    #[must_use]
    pub fn live_url(&self, page_id: &str, path: &str) -> String {
        self.url(&format!("/products/live/{page_id}{path}"))
    }

    /// Poll the table fragment until `done` holds, returning that fragment.
    pub async fn wait_for_table(&self, page_id: &str, done: impl Fn(&str) -> bool) -> String {
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
        loop {
            let response = self
                .client
                .get(self.live_url(page_id, "/table"))
                .send()
                .await
                .expect("table request");
            let html = response.text().await.expect("table body");
            if done(&html) {
                return html;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "table never reached the expected state:\n{html}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// Live page id from the products page's `sse-connect` attribute.
#[must_use]
pub fn page_id(html: &str) -> Option<String> {
    let start = html.find("/products/live/")? + "/products/live/".len();
    let rest = html.get(start..)?;
    let end = rest.find('/')?;
    rest.get(..end).map(str::to_string)
}

/// A client that keeps cookies and reports redirects instead of following.
#[must_use]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id() {
        let html = r#"<div hx-ext="sse" sse-connect="/products/live/abc-123/events">"#;
        assert_eq!(page_id(html).as_deref(), Some("abc-123"));
        assert_eq!(page_id("<p>nothing</p>"), None);
    }
}
