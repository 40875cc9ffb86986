//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                    - Health check
//! GET  /                                          - Landing page
//!
//! # Auth
//! GET  /sign-in, POST /sign-in                    - Sign-in form
//! GET  /sign-up, POST /sign-up                    - Sign-up form
//! POST /logout                                    - Clear credential
//!
//! # Products (live page)
//! GET  /products                                  - Mount a page and render it
//! GET  /products/live/{page}/events               - SSE: table, headers, toasts
//! GET  /products/live/{page}/table                - Table body fragment
//! POST /products/live/{page}/filters              - One filter keystroke
//! POST /products/live/{page}/sort/{column}        - Toggle column sort
//! POST /products/live/{page}/menu/close           - Outside click
//! POST /products/live/{page}/menu/{id}            - Toggle a row menu
//! GET  /products/live/{page}/modal/new            - Empty create modal
//! GET  /products/live/{page}/modal/{id}           - Edit modal for a row
//! POST /products/live/{page}/products             - Submit create modal
//! POST /products/live/{page}/products/{id}        - Submit edit modal
//! POST /products/live/{page}/products/{id}/delete - Delete a row
//! ```

pub mod auth;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Dashboard pages that read the visitor's session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        // Auth
        .route("/sign-in", get(auth::sign_in_page).post(auth::sign_in))
        .route("/sign-up", get(auth::sign_up_page).post(auth::sign_up))
        .route("/logout", post(auth::logout))
        // Products
        .route("/products", get(products::index))
}

/// Endpoints of a mounted live page, addressed by page id.
///
/// These sit outside the session layer: the page carries the credential it
/// was mounted with, and keeping them out means their requests never save a
/// stale copy of the session record over the page's own filter writes.
pub fn live_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(products::events))
        .route("/table", get(products::table))
        .route("/filters", post(products::filter_input))
        .route("/sort/{column}", post(products::sort))
        .route("/menu/close", post(products::close_menu))
        .route("/menu/{id}", post(products::toggle_menu))
        .route("/modal/new", get(products::new_modal))
        .route("/modal/{id}", get(products::edit_modal))
        .route("/products", post(products::create))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/delete", post(products::delete))
}

/// The complete application: routes, sessions, tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer((*state.sessions()).clone(), state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes().layer(session_layer))
        .nest("/products/live/{page}", live_routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
