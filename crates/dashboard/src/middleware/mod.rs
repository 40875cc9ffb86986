//! HTTP middleware stack for the dashboard.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (`x-request-id`, recorded on the span)
//! 4. Session layer (tower-sessions with the in-memory store)
//!
//! Authentication is enforced per handler with the extractors in [`auth`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{ClientSession, RequireSession};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_expiry};
