//! Product dashboard route handlers.
//!
//! `GET /products` mounts a live page and renders it. Everything after that
//! goes through the page's id: inputs are posted as small htmx requests that
//! answer `204` (or a modal fragment), and the page pushes its re-rendered
//! table, header row and toasts over one SSE stream.

use std::convert::Infallible;
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use producthub_core::{
    FilterKey, FormErrors, Product, ProductForm, ProductId, ProductModal, ProductStatus,
    SortColumn,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::components::{FilterControl, HeaderCell, header_cells};
use crate::error::AppError;
use crate::filters;
use crate::live::{LiveHandle, PageEvent, PageId, PageView, truncate_description};
use crate::middleware::{RequireSession, session_expiry};
use crate::services::{ClientStorage, Notice, StoredSessionStorage};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One table row as displayed.
#[derive(Debug, Clone)]
pub struct ProductRow {
    /// Server id, empty for records without one.
    pub id: String,
    pub display_id: String,
    pub name: String,
    pub image: String,
    /// Description, truncated for the table.
    pub description: String,
    pub category: String,
    pub price: String,
    pub quantity: u32,
    pub status: &'static str,
    /// Whether this row's action menu is open.
    pub menu_open: bool,
}

impl ProductRow {
    fn new(product: &Product, menu_open: Option<ProductId>) -> Self {
        Self {
            id: product.id.map(|id| id.to_string()).unwrap_or_default(),
            display_id: product.display_id.clone().unwrap_or_default(),
            name: product.name.clone(),
            image: product.image.clone(),
            description: truncate_description(&product.description).into_owned(),
            category: product.category.clone(),
            price: product.price.to_string(),
            quantity: product.quantity,
            status: product.status.label(),
            menu_open: product.id.is_some() && product.id == menu_open,
        }
    }

    /// Whether the row can be edited or deleted.
    #[must_use]
    pub fn has_actions(&self) -> bool {
        !self.id.is_empty()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Full dashboard page.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub logged_in: bool,
    pub page_id: PageId,
    pub filter_row: Vec<FilterControl>,
    /// Pre-rendered header row fragment.
    pub headers: String,
    /// Pre-rendered table body fragment.
    pub rows: String,
}

/// Header row with sort indicators.
#[derive(Template)]
#[template(path = "products/_headers.html")]
pub struct HeadersTemplate {
    pub page_id: PageId,
    pub cells: Vec<HeaderCell>,
}

/// Table body.
#[derive(Template)]
#[template(path = "products/_rows.html")]
pub struct RowsTemplate {
    pub page_id: PageId,
    pub loading: bool,
    pub rows: Vec<ProductRow>,
    /// Render the outside-click overlay.
    pub listening: bool,
    pub columns: usize,
}

impl RowsTemplate {
    fn new(page_id: PageId, view: &PageView) -> Self {
        Self {
            page_id,
            loading: view.loading,
            rows: view
                .rows
                .iter()
                .map(|p| ProductRow::new(p, view.menu_open))
                .collect(),
            listening: view.listening,
            columns: crate::components::product_table::COLUMNS.len(),
        }
    }
}

/// Create/edit modal.
#[derive(Template, WebTemplate)]
#[template(path = "products/_modal.html")]
pub struct ModalTemplate {
    pub page_id: PageId,
    /// Id of the record being edited, empty for create.
    pub edit_id: String,
    pub form: ProductForm,
    pub errors: FormErrors,
}

impl ModalTemplate {
    fn new(page_id: PageId, modal: &ProductModal) -> Self {
        Self {
            page_id,
            edit_id: modal
                .original()
                .and_then(|p| p.id)
                .map(|id| id.to_string())
                .unwrap_or_default(),
            form: modal.form().clone(),
            errors: modal.errors().clone(),
        }
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        !self.edit_id.is_empty()
    }

    /// Inline message for `field`, or empty.
    #[must_use]
    pub fn field_error(&self, field: &str) -> &str {
        self.errors.get(field).unwrap_or_default()
    }

    /// Status options for the select.
    #[must_use]
    pub fn statuses(&self) -> Vec<&'static str> {
        ProductStatus::ALL.iter().map(ProductStatus::label).collect()
    }

    #[must_use]
    pub fn status_selected(&self, option: &str) -> bool {
        self.form.status == option
    }
}

/// A transient notice.
#[derive(Template)]
#[template(path = "_toast.html")]
pub struct ToastTemplate<'a> {
    pub kind: &'static str,
    pub message: &'a str,
}

impl<'a> From<&'a Notice> for ToastTemplate<'a> {
    fn from(notice: &'a Notice) -> Self {
        Self {
            kind: notice.kind.as_str(),
            message: &notice.message,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// One filter keystroke.
#[derive(Debug, Deserialize)]
pub struct FilterInputForm {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn live_handle(state: &AppState, page: PageId) -> Result<LiveHandle, AppError> {
    state
        .live()
        .get(page)
        .ok_or_else(|| AppError::NotFound(format!("live page {page}")))
}

async fn send(handle: &LiveHandle, event: PageEvent) -> Result<StatusCode, AppError> {
    if handle.send(event).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("live page stopped".to_string()))
    }
}

fn render_headers(page_id: PageId, view: &PageView) -> Result<String, askama::Error> {
    HeadersTemplate {
        page_id,
        cells: header_cells(&view.filters, view.sort),
    }
    .render()
}

fn render_rows(page_id: PageId, view: &PageView) -> Result<String, askama::Error> {
    RowsTemplate::new(page_id, view).render()
}

/// SSE events for one snapshot: table body, header row, then any notices
/// the browser has not seen yet.
fn snapshot_events(page_id: PageId, view: &PageView, handle: &LiveHandle) -> Vec<Event> {
    let mut events = Vec::new();

    match render_rows(page_id, view) {
        Ok(html) => events.push(Event::default().event("table").data(html)),
        Err(e) => warn!(error = %e, "Failed to render table"),
    }
    match render_headers(page_id, view) {
        Ok(html) => events.push(Event::default().event("headers").data(html)),
        Err(e) => warn!(error = %e, "Failed to render headers"),
    }

    for notice in view.notices_after(handle.delivered_notice()) {
        match ToastTemplate::from(notice).render() {
            Ok(html) => events.push(Event::default().event("toast").data(html)),
            Err(e) => warn!(error = %e, "Failed to render toast"),
        }
    }
    handle.set_delivered_notice(view.latest_notice_id());

    events
}

// =============================================================================
// Page
// =============================================================================

/// Mount a live page and render the dashboard.
///
/// GET /products
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireSession(context): RequireSession,
) -> Result<impl IntoResponse, AppError> {
    // The page outlives this request, so it writes through the store rather
    // than through this request's copy of the session.
    let storage: Arc<dyn ClientStorage> = match session.id() {
        Some(id) => Arc::new(StoredSessionStorage::new(
            id,
            state.sessions(),
            session_expiry(),
        )),
        None => context.storage(),
    };

    let (page_id, handle) = state
        .live()
        .mount(
            state.api(),
            storage,
            context.token().cloned(),
            state.config().filter_debounce,
            session.id(),
        )
        .await;

    let view = handle.snapshot();
    let filter_row = header_cells(&view.filters, view.sort)
        .into_iter()
        .map(|cell| cell.filter)
        .collect();

    Ok(ProductsTemplate {
        logged_in: context.is_logged_in(),
        page_id,
        filter_row,
        headers: render_headers(page_id, &view)?,
        rows: render_rows(page_id, &view)?,
    })
}

/// Stream the page's updates.
///
/// GET /products/live/{page}/events
///
/// The page is unmounted when this stream ends.
pub async fn events(
    State(state): State<AppState>,
    Path(page_id): Path<PageId>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let handle = live_handle(&state, page_id)?;
    handle.mark_connected();
    let guard = state.live().stream_guard(page_id);
    let mut view = handle.subscribe();
    debug!(page_id = %page_id, "Live page connected");

    let stream = async_stream::stream! {
        let _guard = guard;
        loop {
            let snapshot = view.borrow_and_update().clone();
            for event in snapshot_events(page_id, &snapshot, &handle) {
                yield Ok(event);
            }
            if view.changed().await.is_err() {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Current table body.
///
/// GET /products/live/{page}/table
pub async fn table(
    State(state): State<AppState>,
    Path(page_id): Path<PageId>,
) -> Result<Html<String>, AppError> {
    let handle = live_handle(&state, page_id)?;
    Ok(Html(render_rows(page_id, &handle.snapshot())?))
}

// =============================================================================
// Inputs
// =============================================================================

/// POST /products/live/{page}/filters
pub async fn filter_input(
    State(state): State<AppState>,
    Path(page_id): Path<PageId>,
    Form(form): Form<FilterInputForm>,
) -> Result<StatusCode, AppError> {
    let key = form.key.parse::<FilterKey>().map_err(AppError::BadRequest)?;
    let handle = live_handle(&state, page_id)?;
    send(
        &handle,
        PageEvent::FilterInput {
            key,
            value: form.value,
        },
    )
    .await
}

/// POST /products/live/{page}/sort/{column}
pub async fn sort(
    State(state): State<AppState>,
    Path((page_id, column)): Path<(PageId, String)>,
) -> Result<StatusCode, AppError> {
    let column = column.parse::<SortColumn>().map_err(AppError::BadRequest)?;
    let handle = live_handle(&state, page_id)?;
    send(&handle, PageEvent::Sort(column)).await
}

/// POST /products/live/{page}/menu/{id}
pub async fn toggle_menu(
    State(state): State<AppState>,
    Path((page_id, id)): Path<(PageId, i64)>,
) -> Result<StatusCode, AppError> {
    let handle = live_handle(&state, page_id)?;
    send(&handle, PageEvent::ToggleMenu(ProductId::new(id))).await
}

/// POST /products/live/{page}/menu/close
pub async fn close_menu(
    State(state): State<AppState>,
    Path(page_id): Path<PageId>,
) -> Result<StatusCode, AppError> {
    let handle = live_handle(&state, page_id)?;
    send(&handle, PageEvent::CloseMenu).await
}

// =============================================================================
// Modal
// =============================================================================

/// Empty create form.
///
/// GET /products/live/{page}/modal/new
pub async fn new_modal(
    State(state): State<AppState>,
    Path(page_id): Path<PageId>,
) -> Result<ModalTemplate, AppError> {
    live_handle(&state, page_id)?;
    Ok(ModalTemplate::new(page_id, &ProductModal::create()))
}

/// Edit form seeded from the displayed row.
///
/// GET /products/live/{page}/modal/{id}
pub async fn edit_modal(
    State(state): State<AppState>,
    Path((page_id, id)): Path<(PageId, i64)>,
) -> Result<ModalTemplate, AppError> {
    let handle = live_handle(&state, page_id)?;
    let product = displayed(&handle, ProductId::new(id))?;

    // Choosing Edit closes the row menu.
    handle.send(PageEvent::CloseMenu).await;
    Ok(ModalTemplate::new(page_id, &ProductModal::edit(product)))
}

fn displayed(handle: &LiveHandle, id: ProductId) -> Result<Product, AppError> {
    handle
        .snapshot()
        .find(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Submit the create form.
///
/// POST /products/live/{page}/products
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Path(page_id): Path<PageId>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let handle = live_handle(&state, page_id)?;
    submit_modal(&handle, page_id, ProductModal::create(), form).await
}

/// Submit the edit form.
///
/// POST /products/live/{page}/products/{id}
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path((page_id, id)): Path<(PageId, i64)>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let handle = live_handle(&state, page_id)?;
    let product = displayed(&handle, ProductId::new(id))?;
    submit_modal(&handle, page_id, ProductModal::edit(product), form).await
}

/// Validate a modal submission.
///
/// Valid input is handed to the page and the modal closes right away (an
/// empty body); the outcome arrives later as a toast. Invalid input
/// re-renders the modal with its errors.
async fn submit_modal(
    handle: &LiveHandle,
    page_id: PageId,
    mut modal: ProductModal,
    form: ProductForm,
) -> Result<Response, AppError> {
    match modal.submit(form) {
        Some(submission) => {
            send(handle, PageEvent::Submit(submission)).await?;
            Ok(Html(String::new()).into_response())
        }
        None => Ok(ModalTemplate::new(page_id, &modal).into_response()),
    }
}

/// POST /products/live/{page}/products/{id}/delete
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path((page_id, id)): Path<(PageId, i64)>,
) -> Result<StatusCode, AppError> {
    let handle = live_handle(&state, page_id)?;
    send(&handle, PageEvent::Delete(ProductId::new(id))).await
}
