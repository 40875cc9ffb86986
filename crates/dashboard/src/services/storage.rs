//! Client-side key/value storage.
//!
//! The browser front-end kept its credential and filters in local storage.
//! Here the same role is played by [`ClientStorage`]: the dashboard backs it
//! with the visitor's `tower-sessions` session, the CLI with a JSON file,
//! and tests with [`MemoryStorage`]. Every call is atomic on its own; there
//! is no transaction concept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tower_sessions::session::Id;
use tower_sessions::{Expiry, MemoryStore, Session};

/// Storage keys shared by every front-end.
pub mod keys {
    /// Serialized `FilterState` for the product view.
    pub const FILTERS: &str = "productFilters";
    /// Opaque bearer credential.
    pub const TOKEN: &str = "token";
    /// One-shot success message shown on the next page.
    pub const FLASH: &str = "flash";
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded.
    #[error("Corrupt storage: {0}")]
    Corrupt(String),
}

/// String key/value storage scoped to one client.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// [`ClientStorage`] backed by the visitor's session.
///
/// Writes are saved to the store immediately so that background tasks (the
/// live page persisting filters between requests) are not lost when no
/// response is being produced for the session.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ClientStorage for SessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.session.insert(key, value).await?;
        self.session.save().await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove_value(key).await?;
        self.session.save().await?;
        Ok(())
    }
}

/// [`ClientStorage`] over a session record that outlives its request.
///
/// Live pages write filters long after the request that mounted them has
/// finished. Each call loads the record fresh from the store, so a write
/// never resurrects values another request has since removed (such as the
/// credential after a logout).
#[derive(Debug, Clone)]
pub struct StoredSessionStorage {
    id: Id,
    store: Arc<MemoryStore>,
    expiry: Expiry,
}

impl StoredSessionStorage {
    #[must_use]
    pub const fn new(id: Id, store: Arc<MemoryStore>, expiry: Expiry) -> Self {
        Self { id, store, expiry }
    }

    fn session(&self) -> Session {
        Session::new(Some(self.id), Arc::clone(&self.store), Some(self.expiry.clone()))
    }
}

#[async_trait]
impl ClientStorage for StoredSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        SessionStorage::new(self.session()).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        SessionStorage::new(self.session()).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        SessionStorage::new(self.session()).remove(key).await
    }
}

/// In-memory [`ClientStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Corrupt("storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
