//! Server-driven live pages.
//!
//! The products view runs on the server: each open browser tab has a page
//! task that owns the filters, the product list and the action menu. The
//! browser posts raw inputs and receives rendered fragments over
//! server-sent events.
//!
//! - `debounce` - Trailing-edge debouncer over a `watch` channel
//! - `filter_panel` - Local filter inputs with debounced output
//! - `page` - The per-tab actor
//! - `hub` - Registry of mounted pages
//! - `view` - Snapshots published to the event stream

pub mod debounce;
pub mod filter_panel;
pub mod hub;
pub mod page;
pub mod view;

pub use debounce::Debouncer;
pub use filter_panel::FilterPanel;
pub use hub::{LiveHandle, LiveHub, PageId, StreamGuard};
pub use page::{LivePage, PageChannels, PageEvent};
pub use view::{PageView, truncate_description};
