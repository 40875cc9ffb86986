//! Session extractors.
//!
//! Both extractors build a [`SessionContext`] over the visitor's session and
//! run its one-time credential check before the handler sees it.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::services::{SIGN_IN_PATH, SessionContext, SessionStorage};

/// Extractor that requires a signed-in visitor.
///
/// Unauthenticated page loads are redirected to `/sign-in`; htmx requests
/// get an `HX-Redirect` instead so the whole page navigates.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireSession(session): RequireSession) -> impl IntoResponse {
///     format!("token present: {}", session.token().is_some())
/// }
/// ```
pub struct RequireSession(pub SessionContext);

/// Extractor for the visitor's session context, signed in or not.
pub struct ClientSession(pub SessionContext);

/// Rejection for the session extractors.
#[derive(Debug)]
pub enum SessionRejection {
    /// Redirect to the sign-in page (full page loads).
    RedirectToSignIn,
    /// Tell htmx to navigate to the sign-in page.
    HxRedirectToSignIn,
    /// The session layer is missing or its store failed.
    Unavailable,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn => Redirect::to(SIGN_IN_PATH).into_response(),
            Self::HxRedirectToSignIn => {
                (StatusCode::UNAUTHORIZED, [("HX-Redirect", SIGN_IN_PATH)]).into_response()
            }
            Self::Unavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
            }
        }
    }
}

/// Whether the request was issued by htmx.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

async fn load_context(parts: &Parts) -> Result<SessionContext, SessionRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(SessionRejection::Unavailable)?;

    SessionContext::load(Arc::new(SessionStorage::new(session)))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to read session");
            SessionRejection::Unavailable
        })
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = load_context(parts).await?;

        if context.redirect_target().is_some() {
            return Err(if is_htmx(&parts.headers) {
                SessionRejection::HxRedirectToSignIn
            } else {
                SessionRejection::RedirectToSignIn
            });
        }

        Ok(Self(context))
    }
}

impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        load_context(parts).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_rejection() {
        let response = SessionRejection::RedirectToSignIn.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/sign-in");
    }

    #[test]
    fn test_htmx_rejection() {
        let response = SessionRejection::HxRedirectToSignIn.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/sign-in");
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", "true".parse().unwrap());
        assert!(is_htmx(&headers));
    }
}
