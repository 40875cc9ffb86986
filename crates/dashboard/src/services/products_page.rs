//! State of the products view.
//!
//! [`ProductsPage`] is a plain state machine: it decides *what* should happen
//! (fetch with these filters, prepend this record, show this notice) while
//! the live page actor performs the I/O and feeds results back in.
//!
//! # Fetch ordering
//!
//! Every fetch is tagged with a generation number. A completion is applied
//! only if it carries the latest generation, so a slow response for old
//! filters can never overwrite the result of a newer request.

use std::collections::VecDeque;

use producthub_core::{FilterState, Product, ProductId, SortColumn, SortState};
use serde::Serialize;

use crate::api::ApiError;

/// Notices kept for late subscribers.
const MAX_NOTICES: usize = 20;

pub const LOADED_MESSAGE: &str = "Products loaded successfully!";
pub const CREATED_MESSAGE: &str = "Product added successfully!";
pub const UPDATED_MESSAGE: &str = "Product updated successfully!";
pub const DELETED_MESSAGE: &str = "Product deleted successfully!";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized, please login.";
pub const MISSING_ID_MESSAGE: &str = "Invalid product: missing ID";

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A transient toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Monotonic per page; used to deliver each notice once.
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// A list fetch the caller should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub filters: FilterState,
}

/// State of one products view.
#[derive(Debug, Default)]
pub struct ProductsPage {
    filters: FilterState,
    filters_loaded: bool,
    products: Vec<Product>,
    generation: u64,
    fetch_loading: bool,
    actions_in_flight: usize,
    notices: VecDeque<Notice>,
    next_notice_id: u64,
    sort: Option<SortState>,
}

impl ProductsPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore persisted filters once.
    ///
    /// A missing or unreadable value yields empty filters. Fetching is not
    /// possible until this has run.
    pub fn restore(&mut self, saved: Option<&str>) -> &FilterState {
        if !self.filters_loaded {
            self.filters = match saved.map(FilterState::from_json) {
                Some(Ok(filters)) => filters,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Ignoring unreadable saved filters");
                    FilterState::new()
                }
                None => FilterState::new(),
            };
            self.filters_loaded = true;
        }
        &self.filters
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub const fn filters_loaded(&self) -> bool {
        self.filters_loaded
    }

    /// The canonical list, in server order with local mutations applied.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Find a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == Some(id))
    }

    /// Whether a list fetch is outstanding.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.fetch_loading
    }

    /// Whether any create/update/delete is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.actions_in_flight > 0
    }

    /// Whether the table should show the loading indicator.
    #[must_use]
    pub const fn shows_loading(&self) -> bool {
        self.fetch_loading || self.is_busy()
    }

    #[must_use]
    pub const fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Cycle the sort on `column`.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort = Some(SortState::toggle(self.sort, column));
    }

    /// Products in display order. The canonical list is left untouched.
    #[must_use]
    pub fn display_rows(&self) -> Vec<&Product> {
        let mut rows: Vec<&Product> = self.products.iter().collect();
        if let Some(sort) = &self.sort {
            sort.apply(&mut rows);
        }
        rows
    }

    /// Accept settled filters from the panel.
    ///
    /// Returns `true` when they differ from the current ones; the caller
    /// then persists them and starts a fetch. Filters that settle before
    /// restoration are ignored.
    pub fn settle_filters(&mut self, filters: FilterState) -> bool {
        if !self.filters_loaded || filters == self.filters {
            return false;
        }
        self.filters = filters;
        true
    }

    /// Start a list fetch for the current filters.
    ///
    /// Returns `None` until filters are restored or without a credential.
    pub fn begin_fetch(&mut self, has_token: bool) -> Option<FetchRequest> {
        if !self.filters_loaded || !has_token {
            return None;
        }
        self.generation += 1;
        self.fetch_loading = true;
        Some(FetchRequest {
            generation: self.generation,
            filters: self.filters.clone(),
        })
    }

    /// Apply a fetch completion.
    ///
    /// Returns `false` if it was stale and discarded. Failures keep the
    /// previous list and raise an error notice.
    pub fn finish_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<Product>, ApiError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "Discarding stale fetch");
            return false;
        }
        self.fetch_loading = false;
        match result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Products fetched");
                self.products = products;
                self.notify_success(LOADED_MESSAGE);
            }
            Err(e) => self.notify_api_error(&e),
        }
        true
    }

    /// Mark a create/update/delete as outstanding.
    pub fn begin_action(&mut self) {
        self.actions_in_flight += 1;
    }

    fn end_action(&mut self) {
        self.actions_in_flight = self.actions_in_flight.saturating_sub(1);
    }

    /// Validate that `product` can be sent as an update.
    ///
    /// Raises the missing-id notice when it cannot.
    pub fn update_target(&mut self, product: &Product) -> Option<ProductId> {
        if product.id.is_none() {
            self.notify_error(MISSING_ID_MESSAGE);
        }
        product.id
    }

    /// Apply a create completion: the server's record goes to the head.
    pub fn finish_create(&mut self, result: Result<Product, ApiError>) {
        self.end_action();
        match result {
            Ok(product) => {
                if let Some(id) = product.id {
                    self.products.retain(|p| p.id != Some(id));
                }
                self.products.insert(0, product);
                self.notify_success(CREATED_MESSAGE);
            }
            Err(e) => self.notify_api_error(&e),
        }
    }

    /// Apply an update completion: `product` replaces the record with its id.
    pub fn finish_update(&mut self, product: Product, result: Result<(), ApiError>) {
        self.end_action();
        match result {
            Ok(()) => {
                if let Some(slot) = self
                    .products
                    .iter_mut()
                    .find(|p| p.id.is_some() && p.id == product.id)
                {
                    *slot = product;
                }
                self.notify_success(UPDATED_MESSAGE);
            }
            Err(e) => self.notify_api_error(&e),
        }
    }

    /// Apply a delete completion: exactly the record with `id` is removed.
    pub fn finish_delete(&mut self, id: ProductId, result: Result<(), ApiError>) {
        self.end_action();
        match result {
            Ok(()) => {
                self.products.retain(|p| p.id != Some(id));
                self.notify_success(DELETED_MESSAGE);
            }
            Err(e) => self.notify_api_error(&e),
        }
    }

    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeKind::Success, message.into());
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeKind::Error, message.into());
    }

    fn notify_api_error(&mut self, error: &ApiError) {
        self.notify_error(error.user_message());
    }

    fn push_notice(&mut self, kind: NoticeKind, message: String) {
        self.next_notice_id += 1;
        self.notices.push_back(Notice {
            id: self.next_notice_id,
            kind,
            message,
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    /// Recent notices, oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }
}
