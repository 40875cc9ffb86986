//! Session middleware configuration.
//!
//! The visitor's session is the dashboard's client storage: it holds the
//! catalog credential and the saved product filters. Sessions live in
//! memory, so they do not survive a restart.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::DashboardConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "producthub_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Expiry applied to every session record.
#[must_use]
pub fn session_expiry() -> Expiry {
    Expiry::OnInactivity(tower_sessions::cookie::time::Duration::seconds(
        SESSION_EXPIRY_SECONDS,
    ))
}

/// Create the session layer over `store`.
///
/// The same store is kept in `AppState` so live pages can write to a
/// visitor's session after the mounting request has finished.
#[must_use]
pub fn create_session_layer(
    store: MemoryStore,
    config: &DashboardConfig,
) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(session_expiry())
        .with_secure(config.is_secure())
        // Lax so that links into the dashboard keep the session.
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
