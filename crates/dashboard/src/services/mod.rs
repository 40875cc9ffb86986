//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `storage` - Client key/value storage (session, file, memory)
//! - `session` - Authentication state over client storage
//! - `products_page` - State machine behind the products view

pub mod products_page;
pub mod session;
pub mod storage;

pub use products_page::{FetchRequest, Notice, NoticeKind, ProductsPage};
pub use session::{AuthState, SIGN_IN_PATH, SessionContext, SessionToken};
pub use storage::{
    ClientStorage, MemoryStorage, SessionStorage, StorageError, StoredSessionStorage, keys,
};
