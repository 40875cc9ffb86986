//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::ClientSession;
use crate::services::{SessionContext, keys};

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub logged_in: bool,
    /// One-shot success message left by sign-in or sign-up.
    pub flash: Option<String>,
}

/// Display the landing page.
pub async fn index(ClientSession(context): ClientSession) -> impl IntoResponse {
    HomeTemplate {
        logged_in: context.is_logged_in(),
        flash: take_flash(&context).await,
    }
}

/// Read and clear the one-shot message for this session.
pub async fn take_flash(context: &SessionContext) -> Option<String> {
    let storage = context.storage();
    let flash = match storage.get(keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash message");
            return None;
        }
    };
    if flash.is_some()
        && let Err(e) = storage.remove(keys::FLASH).await
    {
        tracing::warn!(error = %e, "Failed to clear flash message");
    }
    flash
}
