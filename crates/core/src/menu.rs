//! Per-row action menu state.
//!
//! At most one row menu is open at a time, so the whole state is a single
//! nullable product id. While a menu is open the page holds an
//! [`OutsideClickGuard`]: a scoped subscription to document-level clicks that
//! is released as soon as the menu closes or the menu itself is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::ProductId;

/// Registry of active outside-click subscriptions for one page.
///
/// Views consult [`is_listening`](Self::is_listening) to decide whether to
/// emit the document-level click hook at all.
#[derive(Debug, Clone, Default)]
pub struct OutsideClickListeners {
    active: Arc<AtomicUsize>,
}

impl OutsideClickListeners {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a subscription; it is released when the guard drops.
    #[must_use]
    pub fn subscribe(&self) -> OutsideClickGuard {
        self.active.fetch_add(1, Ordering::AcqRel);
        OutsideClickGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Whether any subscription is live.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.active() > 0
    }
}

/// A live outside-click subscription.
#[derive(Debug)]
pub struct OutsideClickGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for OutsideClickGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Open/closed state of the row action menus.
#[derive(Debug)]
pub struct ActionMenu {
    listeners: OutsideClickListeners,
    open: Option<(ProductId, OutsideClickGuard)>,
}

impl ActionMenu {
    /// A closed menu bound to `listeners`.
    #[must_use]
    pub const fn new(listeners: OutsideClickListeners) -> Self {
        Self {
            listeners,
            open: None,
        }
    }

    /// The row whose menu is open.
    #[must_use]
    pub fn open_id(&self) -> Option<ProductId> {
        self.open.as_ref().map(|(id, _)| *id)
    }

    /// Whether `id`'s menu is open.
    #[must_use]
    pub fn is_open(&self, id: ProductId) -> bool {
        self.open_id() == Some(id)
    }

    /// Open `id`'s menu, or close it if it is already open.
    pub fn toggle(&mut self, id: ProductId) {
        if self.is_open(id) {
            self.close();
            return;
        }
        // Moving between rows keeps a single subscription alive.
        let guard = match self.open.take() {
            Some((_, guard)) => guard,
            None => self.listeners.subscribe(),
        };
        self.open = Some((id, guard));
    }

    /// Close whatever menu is open and release the subscription.
    pub fn close(&mut self) {
        self.open = None;
    }

    /// A click landed outside the open menu.
    pub fn outside_click(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_row_closes() {
        let listeners = OutsideClickListeners::new();
        let mut menu = ActionMenu::new(listeners.clone());

        menu.toggle(ProductId::new(1));
        assert!(menu.is_open(ProductId::new(1)));
        assert_eq!(listeners.active(), 1);

        menu.toggle(ProductId::new(1));
        assert_eq!(menu.open_id(), None);
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn test_toggle_other_row_moves_menu() {
        let listeners = OutsideClickListeners::new();
        let mut menu = ActionMenu::new(listeners.clone());

        menu.toggle(ProductId::new(1));
        menu.toggle(ProductId::new(2));

        assert!(menu.is_open(ProductId::new(2)));
        assert!(!menu.is_open(ProductId::new(1)));
        assert_eq!(listeners.active(), 1);
    }

    #[test]
    fn test_outside_click_releases_subscription() {
        let listeners = OutsideClickListeners::new();
        let mut menu = ActionMenu::new(listeners.clone());

        menu.toggle(ProductId::new(4));
        assert!(listeners.is_listening());

        menu.outside_click();
        assert!(!listeners.is_listening());
    }

    #[test]
    fn test_drop_releases_subscription() {
        let listeners = OutsideClickListeners::new();
        {
            let mut menu = ActionMenu::new(listeners.clone());
            menu.toggle(ProductId::new(9));
            assert_eq!(listeners.active(), 1);
        }
        assert_eq!(listeners.active(), 0);
    }
}
