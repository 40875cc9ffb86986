//! The live page actor.
//!
//! Each mounted products view is one task that owns all of its state and
//! handles one input at a time: browser events, settled filters and API
//! completions. API calls run in their own tasks and report back through a
//! completion channel, so the page keeps accepting input while they run.
//! After every input the actor publishes a fresh [`PageView`].
//!
//! The task ends when every event sender is gone. Dropping the actor drops
//! the filter panel (cancelling any pending debounce) and the action menu
//! (releasing its outside-click subscription).

use std::sync::Arc;
use std::time::Duration;

use producthub_core::{
    ActionMenu, FilterKey, FilterState, ModalSubmission, OutsideClickListeners, Product,
    ProductId, ProductInput, SortColumn,
};
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info_span, warn};

use super::filter_panel::FilterPanel;
use super::view::PageView;
use crate::api::{ApiError, ProductApi};
use crate::services::products_page::UNAUTHORIZED_MESSAGE;
use crate::services::{ClientStorage, ProductsPage, SessionToken, keys};

/// Buffered browser events per page.
const EVENT_BUFFER: usize = 64;

/// Input from the browser.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// One edit to one filter input.
    FilterInput { key: FilterKey, value: String },
    /// A column header was clicked.
    Sort(SortColumn),
    /// A row's action button was clicked.
    ToggleMenu(ProductId),
    /// A click landed outside the open menu.
    CloseMenu,
    /// The modal passed validation.
    Submit(ModalSubmission),
    /// Delete was chosen from a row menu.
    Delete(ProductId),
}

/// Result of an API call made on behalf of the page.
#[derive(Debug)]
enum Completion {
    Fetched {
        generation: u64,
        result: Result<Vec<Product>, ApiError>,
    },
    Created(Result<Product, ApiError>),
    Updated {
        product: Product,
        result: Result<(), ApiError>,
    },
    Deleted {
        id: ProductId,
        result: Result<(), ApiError>,
    },
}

/// Channels for talking to a running page.
#[derive(Debug)]
pub struct PageChannels {
    pub events: mpsc::Sender<PageEvent>,
    pub view: watch::Receiver<PageView>,
}

/// A mounted products view.
pub struct LivePage {
    page: ProductsPage,
    panel: FilterPanel,
    settled: watch::Receiver<FilterState>,
    menu: ActionMenu,
    listeners: OutsideClickListeners,
    api: Arc<dyn ProductApi>,
    storage: Arc<dyn ClientStorage>,
    token: Option<SessionToken>,
    events: mpsc::Receiver<PageEvent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    view: watch::Sender<PageView>,
}

impl LivePage {
    /// Restore saved filters, start the first fetch, and return the page
    /// together with its channels. Call [`run`](Self::run) to drive it.
    pub async fn mount(
        api: Arc<dyn ProductApi>,
        storage: Arc<dyn ClientStorage>,
        token: Option<SessionToken>,
        debounce: Duration,
    ) -> (Self, PageChannels) {
        let saved = match storage.get(keys::FILTERS).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Failed to read saved filters");
                None
            }
        };

        let mut page = ProductsPage::new();
        let restored = page.restore(saved.as_deref()).clone();
        persist_filters(storage.as_ref(), &restored).await;

        let (panel, settled) = FilterPanel::new(restored, debounce);
        let listeners = OutsideClickListeners::new();
        let (events_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (view, view_rx) = watch::channel(PageView::default());

        let mut live = Self {
            page,
            panel,
            settled,
            menu: ActionMenu::new(listeners.clone()),
            listeners,
            api,
            storage,
            token,
            events,
            completions_tx,
            completions,
            view,
        };
        live.start_fetch();
        live.publish();

        (
            live,
            PageChannels {
                events: events_tx,
                view: view_rx,
            },
        )
    }

    /// Outside-click subscriptions held by this page.
    #[must_use]
    pub fn listeners(&self) -> OutsideClickListeners {
        self.listeners.clone()
    }

    /// Process inputs until every event sender is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                changed = self.settled.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let filters = self.settled.borrow_and_update().clone();
                    self.handle_settled(filters).await;
                }
                Some(completion) = self.completions.recv() => self.handle_completion(completion),
            }
            self.publish();
        }
        debug!("Live page stopped");
    }

    fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::FilterInput { key, value } => self.panel.input(key, value),
            PageEvent::Sort(column) => self.page.toggle_sort(column),
            PageEvent::ToggleMenu(id) => self.menu.toggle(id),
            PageEvent::CloseMenu => self.menu.outside_click(),
            PageEvent::Submit(ModalSubmission::Create(input)) => self.create(input),
            PageEvent::Submit(ModalSubmission::Update(product)) => self.update(product),
            PageEvent::Delete(id) => {
                self.menu.close();
                self.delete(id);
            }
        }
    }

    async fn handle_settled(&mut self, filters: FilterState) {
        if self.page.settle_filters(filters) {
            persist_filters(self.storage.as_ref(), self.page.filters()).await;
            self.start_fetch();
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched { generation, result } => {
                self.page.finish_fetch(generation, result);
            }
            Completion::Created(result) => self.page.finish_create(result),
            Completion::Updated { product, result } => self.page.finish_update(product, result),
            Completion::Deleted { id, result } => self.page.finish_delete(id, result),
        }
    }

    fn start_fetch(&mut self) {
        let Some(token) = self.token.clone() else {
            return;
        };
        let Some(request) = self.page.begin_fetch(true) else {
            return;
        };

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        let span = info_span!("fetch_products", generation = request.generation);
        tokio::spawn(
            async move {
                let result = api.filter_products(&request.filters, &token).await;
                let _ = tx.send(Completion::Fetched {
                    generation: request.generation,
                    result,
                });
            }
            .instrument(span),
        );
    }

    /// The credential for a mutation, or an error notice without one.
    fn mutation_token(&mut self) -> Option<SessionToken> {
        if self.token.is_none() {
            self.page.notify_error(UNAUTHORIZED_MESSAGE);
        }
        self.token.clone()
    }

    fn create(&mut self, input: ProductInput) {
        let Some(token) = self.mutation_token() else {
            return;
        };
        self.page.begin_action();

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        tokio::spawn(
            async move {
                let result = api.create_product(&input, &token).await;
                let _ = tx.send(Completion::Created(result));
            }
            .instrument(info_span!("create_product")),
        );
    }

    fn update(&mut self, product: Product) {
        let Some(token) = self.mutation_token() else {
            return;
        };
        let Some(id) = self.page.update_target(&product) else {
            return;
        };
        self.page.begin_action();

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        tokio::spawn(
            async move {
                let result = api.update_product(id, &product, &token).await;
                let _ = tx.send(Completion::Updated { product, result });
            }
            .instrument(info_span!("update_product", product_id = %id)),
        );
    }

    fn delete(&mut self, id: ProductId) {
        let Some(token) = self.mutation_token() else {
            return;
        };
        self.page.begin_action();

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        tokio::spawn(
            async move {
                let result = api.delete_product(id, &token).await.map(|message| {
                    debug!(%message, "Delete confirmed");
                });
                let _ = tx.send(Completion::Deleted { id, result });
            }
            .instrument(info_span!("delete_product", product_id = %id)),
        );
    }

    fn publish(&self) {
        let snapshot = PageView {
            loading: self.page.shows_loading(),
            rows: self.page.display_rows().into_iter().cloned().collect(),
            menu_open: self.menu.open_id(),
            listening: self.listeners.is_listening(),
            sort: self.page.sort(),
            filters: self.panel.local().clone(),
            notices: self.page.notices().cloned().collect(),
        };
        self.view.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn persist_filters(storage: &dyn ClientStorage, filters: &FilterState) {
    if let Err(e) = storage.set(keys::FILTERS, &filters.to_json()).await {
        warn!(error = %e, "Failed to save filters");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use producthub_core::{ProductStatus, ValidCredentials};

    use super::*;
    use crate::services::{MemoryStorage, NoticeKind};

    const DELAY: Duration = Duration::from_millis(500);

    #[derive(Default)]
    struct FakeApi {
        products: Mutex<Vec<Product>>,
        queries: Mutex<Vec<String>>,
        fail_create: bool,
    }

    impl FakeApi {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                products: Mutex::new(products),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ProductApi for FakeApi {
        async fn login(&self, _: &ValidCredentials) -> Result<SessionToken, ApiError> {
            Ok(SessionToken::new("tok"))
        }

        async fn signup(&self, _: &ValidCredentials) -> Result<SessionToken, ApiError> {
            Ok(SessionToken::new("tok"))
        }

        async fn list_products(&self, _: &SessionToken) -> Result<Vec<Product>, ApiError> {
            Ok(self.products.lock().unwrap().clone())
        }

        async fn filter_products(
            &self,
            filters: &FilterState,
            _: &SessionToken,
        ) -> Result<Vec<Product>, ApiError> {
            self.queries.lock().unwrap().push(filters.to_query());
            let name = filters.get(FilterKey::Name).to_lowercase();
            Ok(self
                .products
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&name))
                .cloned()
                .collect())
        }

        async fn create_product(
            &self,
            input: &ProductInput,
            _: &SessionToken,
        ) -> Result<Product, ApiError> {
            if self.fail_create {
                return Err(ApiError::Api {
                    status: 400,
                    message: "Failed to create product".to_string(),
                });
            }
            let mut products = self.products.lock().unwrap();
            let mut product = Product::from_input(input.clone());
            product.id = Some(ProductId::new(100 + i64::try_from(products.len()).unwrap()));
            products.insert(0, product.clone());
            Ok(product)
        }

        async fn update_product(
            &self,
            _: ProductId,
            _: &Product,
            _: &SessionToken,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_product(&self, _: ProductId, _: &SessionToken) -> Result<String, ApiError> {
            Ok("Product deleted".to_string())
        }
    }

    fn product(id: i64, name: &str) -> Product {
        let mut p = Product::from_input(input(name));
        p.id = Some(ProductId::new(id));
        p
    }

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            image: "https://images.unsplash.com/x".to_string(),
            description: "A perfectly fine product".to_string(),
            category: "General".to_string(),
            price: "10".parse().unwrap(),
            quantity: 1,
            status: ProductStatus::InStock,
        }
    }

    fn names(view: &PageView) -> Vec<String> {
        view.rows.iter().map(|p| p.name.clone()).collect()
    }

    async fn mount(
        api: Arc<FakeApi>,
        storage: Arc<MemoryStorage>,
        token: Option<&str>,
    ) -> (tokio::task::JoinHandle<()>, PageChannels) {
        let (page, channels) =
            LivePage::mount(api, storage, token.map(SessionToken::new), DELAY).await;
        (tokio::spawn(page.run()), channels)
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_fetches_with_restored_filters() {
        let api = Arc::new(FakeApi::with_products(vec![product(1, "Lamp"), product(2, "Desk")]));
        let storage = Arc::new(MemoryStorage::with_entries([(keys::FILTERS, r#"{"name":"lamp"}"#)]));

        let (_task, mut channels) = mount(api.clone(), storage.clone(), Some("tok")).await;
        let view = channels
            .view
            .wait_for(|v| !v.loading && !v.rows.is_empty())
            .await
            .unwrap()
            .clone();

        assert_eq!(names(&view), ["Lamp"]);
        assert_eq!(view.filters.get(FilterKey::Name), "lamp");
        assert_eq!(*api.queries.lock().unwrap(), ["name=lamp"]);
        assert_eq!(view.notices.last().unwrap().message, "Products loaded successfully!");
        // Restoring then saving leaves the stored value as it was.
        assert_eq!(
            storage.get(keys::FILTERS).await.unwrap().as_deref(),
            Some(r#"{"name":"lamp"}"#)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_settles_into_one_fetch() {
        let api = Arc::new(FakeApi::with_products(vec![product(1, "Lamp"), product(2, "Desk")]));
        let storage = Arc::new(MemoryStorage::new());
        let (_task, mut channels) = mount(api.clone(), storage.clone(), Some("tok")).await;
        channels.view.wait_for(|v| !v.loading).await.unwrap();

        for value in ["d", "de", "des"] {
            channels
                .events
                .send(PageEvent::FilterInput {
                    key: FilterKey::Name,
                    value: value.to_string(),
                })
                .await
                .unwrap();
        }

        let view = channels
            .view
            .wait_for(|v| !v.loading && v.rows.len() == 1)
            .await
            .unwrap()
            .clone();
        assert_eq!(names(&view), ["Desk"]);
        assert_eq!(*api.queries.lock().unwrap(), ["", "name=des"]);
        assert_eq!(
            storage.get(keys::FILTERS).await.unwrap().as_deref(),
            Some(r#"{"name":"des"}"#)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_prepends_server_record() {
        let api = Arc::new(FakeApi::with_products(vec![product(1, "Lamp")]));
        let (_task, mut channels) = mount(api, Arc::new(MemoryStorage::new()), Some("tok")).await;
        channels.view.wait_for(|v| !v.rows.is_empty()).await.unwrap();

        channels
            .events
            .send(PageEvent::Submit(ModalSubmission::Create(input("Chair"))))
            .await
            .unwrap();

        let view = channels
            .view
            .wait_for(|v| v.rows.len() == 2 && !v.loading)
            .await
            .unwrap()
            .clone();
        assert_eq!(names(&view), ["Chair", "Lamp"]);
        assert_eq!(view.rows.first().unwrap().id, Some(ProductId::new(101)));
        assert_eq!(view.notices.last().unwrap().message, "Product added successfully!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_create_keeps_list() {
        let api = Arc::new(FakeApi {
            products: Mutex::new(vec![product(1, "Lamp")]),
            fail_create: true,
            ..FakeApi::default()
        });
        let (_task, mut channels) = mount(api, Arc::new(MemoryStorage::new()), Some("tok")).await;
        channels.view.wait_for(|v| !v.rows.is_empty()).await.unwrap();

        channels
            .events
            .send(PageEvent::Submit(ModalSubmission::Create(input("Chair"))))
            .await
            .unwrap();

        let view = channels
            .view
            .wait_for(|v| v.notices.last().is_some_and(|n| n.kind == NoticeKind::Error))
            .await
            .unwrap()
            .clone();
        assert_eq!(names(&view), ["Lamp"]);
        assert!(!view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_closes_menu_and_removes_row() {
        let api = Arc::new(FakeApi::with_products(vec![
            product(1, "a"),
            product(3, "b"),
            product(5, "c"),
        ]));
        let (_task, mut channels) = mount(api, Arc::new(MemoryStorage::new()), Some("tok")).await;
        channels.view.wait_for(|v| v.rows.len() == 3).await.unwrap();

        channels.events.send(PageEvent::ToggleMenu(ProductId::new(3))).await.unwrap();
        let view = channels.view.wait_for(|v| v.menu_open.is_some()).await.unwrap().clone();
        assert!(view.listening);

        channels.events.send(PageEvent::Delete(ProductId::new(3))).await.unwrap();
        let view = channels
            .view
            .wait_for(|v| v.rows.len() == 2 && !v.loading)
            .await
            .unwrap()
            .clone();
        assert_eq!(names(&view), ["a", "c"]);
        assert_eq!(view.menu_open, None);
        assert!(!view.listening);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_token_nothing_is_fetched() {
        let api = Arc::new(FakeApi::with_products(vec![product(1, "Lamp")]));
        let (_task, mut channels) = mount(api.clone(), Arc::new(MemoryStorage::new()), None).await;

        channels
            .events
            .send(PageEvent::Submit(ModalSubmission::Create(input("Chair"))))
            .await
            .unwrap();

        let view = channels.view.wait_for(|v| !v.notices.is_empty()).await.unwrap().clone();
        assert_eq!(view.notices.last().unwrap().message, "Unauthorized, please login.");
        assert!(view.rows.is_empty());
        assert!(api.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_releases_resources() {
        let api = Arc::new(FakeApi::default());
        let (page, channels) = LivePage::mount(
            api.clone(),
            Arc::new(MemoryStorage::new()),
            Some(SessionToken::new("tok")),
            DELAY,
        )
        .await;
        let listeners = page.listeners();
        let task = tokio::spawn(page.run());

        channels.events.send(PageEvent::ToggleMenu(ProductId::new(1))).await.unwrap();
        channels
            .events
            .send(PageEvent::FilterInput {
                key: FilterKey::Name,
                value: "never".to_string(),
            })
            .await
            .unwrap();
        let PageChannels { events, mut view } = channels;
        view.wait_for(|v| v.listening).await.unwrap();

        drop(events);
        task.await.unwrap();

        assert_eq!(listeners.active(), 0);
        tokio::time::sleep(DELAY * 2).await;
        assert!(!api.queries.lock().unwrap().iter().any(|q| q.contains("never")));
    }
}
