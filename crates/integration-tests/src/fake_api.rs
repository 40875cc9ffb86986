//! In-process stand-in for the ProductHub catalog API.
//!
//! Speaks the same JSON shapes as the hosted service: bearer auth, camelCase
//! product records, `{message}` error bodies. Every request to the filter
//! endpoint is recorded so tests can assert on what the dashboard sent.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use producthub_core::{Price, Product, ProductId, ProductInput, ProductStatus};
use serde_json::{Value, json};

/// Account present in every seeded fake.
pub const SEED_EMAIL: &str = "ops@producthub.io";
pub const SEED_PASSWORD: &str = "hunter22";

#[derive(Default)]
struct FakeState {
    users: HashMap<String, String>,
    tokens: HashSet<String>,
    products: Vec<Product>,
    next_id: i64,
    queries: Vec<String>,
}

/// Shared handle to the fake's state.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    /// A fake with one account and three products.
    #[must_use]
    pub fn seeded() -> Self {
        let api = Self::default();
        {
            let mut state = api.lock();
            state
                .users
                .insert(SEED_EMAIL.to_string(), SEED_PASSWORD.to_string());
            state.products = vec![
                product(1, "Desk Lamp", "Lighting", "24.50", 12, ProductStatus::InStock),
                product(2, "Standing Desk", "Furniture", "399", 3, ProductStatus::InStock),
                product(3, "Office Chair", "Furniture", "149.99", 0, ProductStatus::OutOfStock),
            ];
            state.next_id = 4;
        }
        api
    }

    /// Current catalog contents.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    /// Query strings received by the filter endpoint, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    /// A valid bearer token without going through login.
    #[must_use]
    pub fn issue_token(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.lock().tokens.insert(token.clone());
        token
    }

    /// The HTTP surface of the fake.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/signup", post(signup))
            .route("/api/products", get(list).post(create))
            .route("/api/products/filter", get(filter))
            .route("/api/products/{id}", put(update).delete(remove))
            .with_state(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        match token {
            Some(token) if self.lock().tokens.contains(token) => Ok(()),
            _ => Err(message(StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}

fn product(
    id: i64,
    name: &str,
    category: &str,
    price: &str,
    quantity: u32,
    status: ProductStatus,
) -> Product {
    Product {
        id: Some(ProductId::new(id)),
        display_id: Some(format!("P-{id:03}")),
        name: name.to_string(),
        image: format!("https://images.example.com/{id}.jpg"),
        description: format!("{name} for the modern office"),
        category: category.to_string(),
        price: price.parse().unwrap_or_default(),
        quantity,
        status,
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn login(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let known = api.lock().users.get(email).is_some_and(|p| p == password);
    if !known {
        return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    Json(json!({ "token": api.issue_token() })).into_response()
}

async fn signup(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    {
        let mut state = api.lock();
        if state.users.contains_key(&email) {
            return message(StatusCode::CONFLICT, "Email already registered");
        }
        state.users.insert(email, password);
    }
    (StatusCode::CREATED, Json(json!({ "token": api.issue_token() }))).into_response()
}

async fn list(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    if let Err(denied) = api.authorize(&headers) {
        return denied;
    }
    Json(api.products()).into_response()
}

async fn filter(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if let Err(denied) = api.authorize(&headers) {
        return denied;
    }
    let query = query.unwrap_or_default();
    api.lock().queries.push(query.clone());

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let matching: Vec<Product> = api
        .products()
        .into_iter()
        .filter(|product| pairs.iter().all(|(key, value)| matches(product, key, value)))
        .collect();
    Json(matching).into_response()
}

fn matches(product: &Product, key: &str, value: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(&value.to_lowercase());
    let price = || value.parse::<Price>().ok();
    let quantity = || value.parse::<u32>().ok();

    match key {
        "productId" => contains(product.display_id.as_deref().unwrap_or_default()),
        "name" => contains(&product.name),
        "description" => contains(&product.description),
        "category" => contains(&product.category),
        "status" => product.status.label() == value,
        "minPrice" => price().is_none_or(|min| product.price >= min),
        "maxPrice" => price().is_none_or(|max| product.price <= max),
        "minQuantity" => quantity().is_none_or(|min| product.quantity >= min),
        "maxQuantity" => quantity().is_none_or(|max| product.quantity <= max),
        _ => true,
    }
}

async fn create(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Response {
    if let Err(denied) = api.authorize(&headers) {
        return denied;
    }
    let mut state = api.lock();
    let id = state.next_id;
    state.next_id += 1;

    let mut created = Product::from_input(input);
    created.id = Some(ProductId::new(id));
    created.display_id = Some(format!("P-{id:03}"));
    state.products.push(created.clone());

    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(product): Json<Product>,
) -> Response {
    if let Err(denied) = api.authorize(&headers) {
        return denied;
    }
    let mut state = api.lock();
    let Some(existing) = state
        .products
        .iter_mut()
        .find(|p| p.id == Some(ProductId::new(id)))
    else {
        return message(StatusCode::NOT_FOUND, "Product not found");
    };
    *existing = existing.merged_with(product.to_input());
    Json(existing.clone()).into_response()
}

async fn remove(State(api): State<FakeApi>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(denied) = api.authorize(&headers) {
        return denied;
    }
    let mut state = api.lock();
    let before = state.products.len();
    state.products.retain(|p| p.id != Some(ProductId::new(id)));
    if state.products.len() == before {
        return message(StatusCode::NOT_FOUND, "Product not found");
    }
    Json(json!({ "message": "Product deleted" })).into_response()
}
