//! Who is signed in.
//!
//! [`SessionContext`] is built from injected [`ClientStorage`] and owns the
//! authentication state for one client. Nothing here is global: each request
//! (or CLI invocation) constructs its own context over its own storage.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use super::storage::{ClientStorage, StorageError, keys};

/// Path unauthenticated viewers are sent to.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Opaque bearer credential issued by the catalog API.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The wrapped secret.
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.0
    }

    /// Whether the token is empty (treated as absent).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Storage has not been checked yet.
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Authentication state for one client.
pub struct SessionContext {
    storage: Arc<dyn ClientStorage>,
    state: AuthState,
    token: Option<SessionToken>,
}

impl SessionContext {
    /// A context that has not read storage yet.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            storage,
            state: AuthState::Loading,
            token: None,
        }
    }

    /// Build a context and run [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential cannot be read.
    pub async fn load(storage: Arc<dyn ClientStorage>) -> Result<Self, StorageError> {
        let mut context = Self::new(storage);
        context.init().await?;
        Ok(context)
    }

    /// Read the stored credential once. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential cannot be read; the context
    /// stays in [`AuthState::Loading`].
    pub async fn init(&mut self) -> Result<(), StorageError> {
        if self.state != AuthState::Loading {
            return Ok(());
        }

        let token = self
            .storage
            .get(keys::TOKEN)
            .await?
            .map(SessionToken::new)
            .filter(|t| !t.is_empty());

        self.state = if token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        self.token = token;
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> AuthState {
        self.state
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// The storage this context reads and writes.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn ClientStorage> {
        Arc::clone(&self.storage)
    }

    /// Store `token` and mark the client signed in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be stored; the state is
    /// left unchanged.
    pub async fn login(&mut self, token: SessionToken) -> Result<(), StorageError> {
        self.storage
            .set(keys::TOKEN, token.secret().expose_secret())
            .await?;
        self.token = Some(token);
        self.state = AuthState::Authenticated;
        tracing::debug!("session authenticated");
        Ok(())
    }

    /// Forget the credential and mark the client signed out.
    ///
    /// The in-memory state flips even if removing the stored credential
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored credential cannot be removed.
    pub async fn logout(&mut self) -> Result<(), StorageError> {
        self.token = None;
        self.state = AuthState::Unauthenticated;
        tracing::debug!("session cleared");
        self.storage.remove(keys::TOKEN).await
    }

    /// Where a guarded view should send this client, if anywhere.
    ///
    /// Never redirects while the credential check is still loading.
    #[must_use]
    pub const fn redirect_target(&self) -> Option<&'static str> {
        match self.state {
            AuthState::Unauthenticated => Some(SIGN_IN_PATH),
            AuthState::Loading | AuthState::Authenticated => None,
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.state)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::MemoryStorage;

    #[tokio::test]
    async fn test_starts_loading_and_never_redirects() {
        let context = SessionContext::new(Arc::new(MemoryStorage::new()));
        assert_eq!(context.state(), AuthState::Loading);
        assert_eq!(context.redirect_target(), None);
    }

    #[tokio::test]
    async fn test_init_without_token() {
        let context = SessionContext::load(Arc::new(MemoryStorage::new()))
            .await
            .unwrap();
        assert_eq!(context.state(), AuthState::Unauthenticated);
        assert_eq!(context.redirect_target(), Some("/sign-in"));
    }

    #[tokio::test]
    async fn test_init_with_stored_token() {
        let storage = MemoryStorage::with_entries([(keys::TOKEN, "tok-1")]);
        let context = SessionContext::load(Arc::new(storage)).await.unwrap();

        assert!(context.is_logged_in());
        assert_eq!(
            context.token().unwrap().secret().expose_secret(),
            "tok-1"
        );
        assert_eq!(context.redirect_target(), None);
    }

    #[tokio::test]
    async fn test_init_reads_storage_once() {
        let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
        let mut context = SessionContext::load(Arc::clone(&storage)).await.unwrap();

        storage.set(keys::TOKEN, "late").await.unwrap();
        context.init().await.unwrap();
        assert_eq!(context.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
        let mut context = SessionContext::load(Arc::clone(&storage)).await.unwrap();

        context.login(SessionToken::new("tok-2")).await.unwrap();
        assert!(context.is_logged_in());
        assert_eq!(storage.get(keys::TOKEN).await.unwrap().as_deref(), Some("tok-2"));

        context.logout().await.unwrap();
        assert_eq!(context.state(), AuthState::Unauthenticated);
        assert!(context.token().is_none());
        assert_eq!(storage.get(keys::TOKEN).await.unwrap(), None);

        // A fresh context over the same storage is signed out too.
        let next = SessionContext::load(storage).await.unwrap();
        assert_eq!(next.redirect_target(), Some("/sign-in"));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("super-secret");
        assert_eq!(format!("{token:?}"), "SessionToken([REDACTED])");
    }
}
