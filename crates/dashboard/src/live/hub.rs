//! Registry of mounted live pages.
//!
//! `GET /products` mounts a page and renders it with the page's id; the
//! browser then opens the event stream and posts its inputs to that id.
//! The hub only holds the sending side of each page, so removing an entry
//! is enough to stop the page task once its stream goes away. Pages are
//! tagged with the session that mounted them; logging out stops them at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tower_sessions::session::Id as SessionId;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use super::page::{LivePage, PageChannels, PageEvent};
use super::view::PageView;
use crate::api::ProductApi;
use crate::services::{ClientStorage, SessionToken};

/// How long a page may wait for its event stream before it is pruned.
pub const CONNECT_GRACE: Duration = Duration::from_secs(60);

/// Live page identifier.
pub type PageId = Uuid;

/// Handle to one running page.
#[derive(Debug, Clone)]
pub struct LiveHandle {
    events: mpsc::Sender<PageEvent>,
    view: watch::Receiver<PageView>,
    shared: Arc<HandleShared>,
}

#[derive(Debug)]
struct HandleShared {
    mounted_at: Instant,
    connected: AtomicBool,
    delivered_notice: AtomicU64,
}

impl LiveHandle {
    fn new(channels: PageChannels) -> Self {
        Self {
            events: channels.events,
            view: channels.view,
            shared: Arc::new(HandleShared {
                mounted_at: Instant::now(),
                connected: AtomicBool::new(false),
                delivered_notice: AtomicU64::new(0),
            }),
        }
    }

    /// Deliver an input to the page.
    ///
    /// Returns `false` if the page has stopped.
    pub async fn send(&self, event: PageEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// A receiver for the page's snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PageView> {
        self.view.clone()
    }

    /// The latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PageView {
        self.view.borrow().clone()
    }

    /// Record that the event stream attached.
    pub fn mark_connected(&self) {
        self.shared.connected.store(true, Ordering::Release);
    }

    /// Highest notice id already sent to the browser.
    #[must_use]
    pub fn delivered_notice(&self) -> u64 {
        self.shared.delivered_notice.load(Ordering::Acquire)
    }

    /// Record that notices up to `id` were sent.
    pub fn set_delivered_notice(&self, id: u64) {
        self.shared.delivered_notice.fetch_max(id, Ordering::AcqRel);
    }

    fn is_stale(&self, now: Instant) -> bool {
        self.events.is_closed()
            || (!self.shared.connected.load(Ordering::Acquire)
                && now.duration_since(self.shared.mounted_at) > CONNECT_GRACE)
    }
}

/// A hub entry.
#[derive(Debug)]
struct Mounted {
    handle: LiveHandle,
    owner: Option<SessionId>,
    task: Option<AbortHandle>,
}

/// All live pages of this process.
#[derive(Clone, Default)]
pub struct LiveHub {
    pages: Arc<Mutex<HashMap<PageId, Mounted>>>,
}

impl LiveHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<PageId, Mounted>> {
        // A poisoned map is still structurally valid.
        self.pages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Mount a page for the session `owner` and start its task.
    pub async fn mount(
        &self,
        api: Arc<dyn ProductApi>,
        storage: Arc<dyn ClientStorage>,
        token: Option<SessionToken>,
        debounce: Duration,
        owner: Option<SessionId>,
    ) -> (PageId, LiveHandle) {
        self.prune();

        let id = Uuid::new_v4();
        let (page, channels) = LivePage::mount(api, storage, token, debounce).await;
        let task = tokio::spawn(page.run().instrument(info_span!("live_page", page_id = %id)))
            .abort_handle();

        let handle = LiveHandle::new(channels);
        self.insert(id, handle.clone(), owner, Some(task));
        debug!(page_id = %id, "Live page mounted");
        (id, handle)
    }

    fn insert(
        &self,
        id: PageId,
        handle: LiveHandle,
        owner: Option<SessionId>,
        task: Option<AbortHandle>,
    ) {
        self.pages().insert(
            id,
            Mounted {
                handle,
                owner,
                task,
            },
        );
    }

    /// Handle for a mounted page.
    #[must_use]
    pub fn get(&self, id: PageId) -> Option<LiveHandle> {
        self.pages().get(&id).map(|mounted| mounted.handle.clone())
    }

    /// Stop every page mounted by `owner`; returns how many were stopped.
    ///
    /// The pages hold the credential of that session, so they must not
    /// outlive a logout. Their event streams close and later requests to
    /// their ids get 404.
    pub fn revoke_session(&self, owner: SessionId) -> usize {
        let revoked: Vec<(PageId, Mounted)> = {
            let mut pages = self.pages();
            let ids: Vec<PageId> = pages
                .iter()
                .filter(|(_, mounted)| mounted.owner == Some(owner))
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| pages.remove(&id).map(|mounted| (id, mounted)))
                .collect()
        };

        for (id, mounted) in &revoked {
            if let Some(task) = &mounted.task {
                task.abort();
            }
            debug!(page_id = %id, "Live page revoked");
        }
        revoked.len()
    }

    /// Stop tracking a page; its task ends once outstanding handles drop.
    pub fn unmount(&self, id: PageId) {
        if self.pages().remove(&id).is_some() {
            debug!(page_id = %id, "Live page unmounted");
        }
    }

    /// Number of tracked pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unmounts `id` when dropped; held by the page's event stream.
    #[must_use]
    pub fn stream_guard(&self, id: PageId) -> StreamGuard {
        StreamGuard {
            hub: self.clone(),
            id,
        }
    }

    /// Drop pages that stopped or never connected.
    pub fn prune(&self) {
        let now = Instant::now();
        self.pages().retain(|id, mounted| {
            let keep = !mounted.handle.is_stale(now);
            if !keep {
                debug!(page_id = %id, "Pruning live page");
            }
            keep
        });
    }
}

impl std::fmt::Debug for LiveHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveHub")
            .field("pages", &self.len())
            .finish()
    }
}

/// Unmounts a page when its event stream goes away.
#[derive(Debug)]
pub struct StreamGuard {
    hub: LiveHub,
    id: PageId,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.hub.unmount(self.id);
    }
}
