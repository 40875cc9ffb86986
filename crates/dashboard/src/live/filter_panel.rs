//! Filter inputs above the product table.
//!
//! The panel keeps its own copy of the filters so that every keystroke is
//! reflected immediately in the inputs, while the page only sees the
//! debounced result.

use std::time::Duration;

use producthub_core::{FilterKey, FilterState};
use tokio::sync::watch;

use super::debounce::Debouncer;

/// Locally edited filters with a debounced output.
#[derive(Debug)]
pub struct FilterPanel {
    local: FilterState,
    debouncer: Debouncer<FilterState>,
}

impl FilterPanel {
    /// A panel seeded with `initial` (usually the restored filters).
    ///
    /// The receiver yields each settled filter set.
    #[must_use]
    pub fn new(initial: FilterState, delay: Duration) -> (Self, watch::Receiver<FilterState>) {
        let (debouncer, settled) = Debouncer::new(initial.clone(), delay);
        (
            Self {
                local: initial,
                debouncer,
            },
            settled,
        )
    }

    /// One edit to one input.
    pub fn input(&mut self, key: FilterKey, value: impl Into<String>) {
        self.local.set(key, value);
        self.debouncer.push(self.local.clone());
    }

    /// What the inputs currently show.
    #[must_use]
    pub const fn local(&self) -> &FilterState {
        &self.local
    }
}
