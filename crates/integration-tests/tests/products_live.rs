//! The live products page, driven the way htmx drives it.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use producthub_integration_tests::TestContext;
use reqwest::StatusCode;

async fn signed_in() -> (TestContext, String) {
    let ctx = TestContext::start().await;
    ctx.sign_in().await;
    let (page, _) = ctx.open_products().await;
    ctx.wait_for_table(&page, |html| html.contains("Desk Lamp"))
        .await;
    (ctx, page)
}

fn position(html: &str, needle: &str) -> usize {
    html.find(needle)
        .unwrap_or_else(|| panic!("{needle} not in:\n{html}"))
}

/// Whether every needle appears, in the given order.
fn ordered(html: &str, needles: &[&str]) -> bool {
    let found: Option<Vec<usize>> = needles.iter().map(|n| html.find(n)).collect();
    found.is_some_and(|at| at.is_sorted())
}

fn product_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("image", "https://images.example.com/new.jpg".to_string()),
        ("description", "Solid bamboo, holds forty books".to_string()),
        ("category", "Storage".to_string()),
        ("price", "89.90".to_string()),
        ("quantity", "7".to_string()),
        ("status", "In Stock".to_string()),
    ]
}

#[tokio::test]
async fn test_event_stream_sends_table_and_loaded_toast() {
    let ctx = TestContext::start().await;
    ctx.sign_in().await;
    let (page, html) = ctx.open_products().await;
    assert!(html.contains("sse-connect"));

    let mut resp = ctx
        .client
        .get(ctx.live_url(&page, "/events"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut body = String::new();
    let read = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(chunk) = resp.chunk().await.unwrap() {
            body.push_str(&String::from_utf8_lossy(&chunk));
            if body.contains("Products loaded successfully!") && body.contains("Office Chair") {
                break;
            }
        }
    })
    .await;
    assert!(read.is_ok(), "stream never delivered the load:\n{body}");
    assert!(body.contains("event: table"));
    assert!(body.contains("event: toast"));
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let ctx = TestContext::start().await;
    ctx.sign_in().await;

    let page = uuid::Uuid::new_v4().to_string();
    let resp = ctx
        .client
        .get(ctx.live_url(&page, "/table"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_refetches_and_persists() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .post(ctx.live_url(&page, "/filters"))
        .form(&[("key", "name"), ("value", "lamp")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    ctx.wait_for_table(&page, |html| {
        html.contains("Desk Lamp") && !html.contains("Standing Desk")
    })
    .await;
    assert!(ctx.api.queries().iter().any(|q| q == "name=lamp"));

    // A fresh page restores the saved filter.
    let (second, html) = ctx.open_products().await;
    assert!(html.contains(r#"value="lamp""#));
    ctx.wait_for_table(&second, |html| {
        html.contains("Desk Lamp") && !html.contains("Office Chair")
    })
    .await;
}

#[tokio::test]
async fn test_unknown_filter_key_is_rejected() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .post(ctx.live_url(&page, "/filters"))
        .form(&[("key", "colour"), ("value", "red")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sort_by_price() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .post(ctx.live_url(&page, "/sort/price"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    ctx.wait_for_table(&page, |html| {
        ordered(html, &["Desk Lamp", "Office Chair", "Standing Desk"])
    })
    .await;

    ctx.client
        .post(ctx.live_url(&page, "/sort/price"))
        .send()
        .await
        .unwrap();
    ctx.wait_for_table(&page, |html| {
        ordered(html, &["Standing Desk", "Office Chair", "Desk Lamp"])
    })
    .await;
}

#[tokio::test]
async fn test_row_menu_opens_and_closes() {
    let (ctx, page) = signed_in().await;

    ctx.client
        .post(ctx.live_url(&page, "/menu/1"))
        .send()
        .await
        .unwrap();
    ctx.wait_for_table(&page, |html| html.contains("/products/1/delete"))
        .await;

    ctx.client
        .post(ctx.live_url(&page, "/menu/close"))
        .send()
        .await
        .unwrap();
    ctx.wait_for_table(&page, |html| !html.contains("/products/1/delete"))
        .await;
}

#[tokio::test]
async fn test_create_prepends_row() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .post(ctx.live_url(&page, "/products"))
        .form(&product_fields("Bamboo Shelf"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().is_empty(), "modal closes");

    let html = ctx
        .wait_for_table(&page, |html| html.contains("Bamboo Shelf"))
        .await;
    assert!(position(&html, "Bamboo Shelf") < position(&html, "Desk Lamp"));
    assert!(html.contains("P-004"));
    assert_eq!(ctx.api.products().len(), 4);
}

#[tokio::test]
async fn test_invalid_create_keeps_modal_open() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .post(ctx.live_url(&page, "/products"))
        .form(&product_fields(""))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.unwrap();
    assert!(body.contains("Add Product"));
    assert!(body.contains("Product name is required"));
    assert!(body.contains("Solid bamboo"), "submitted values are kept");
    assert_eq!(ctx.api.products().len(), 3);
}

#[tokio::test]
async fn test_edit_modal_and_update() {
    let (ctx, page) = signed_in().await;

    let modal = ctx
        .client
        .get(ctx.live_url(&page, "/modal/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(modal.status(), StatusCode::OK);
    let body = modal.text().await.unwrap();
    assert!(body.contains("Edit Product"));
    assert!(body.contains("Desk Lamp"));

    ctx.client
        .post(ctx.live_url(&page, "/products/1"))
        .form(&product_fields("Brass Lamp"))
        .send()
        .await
        .unwrap();

    ctx.wait_for_table(&page, |html| {
        html.contains("Brass Lamp") && !html.contains(">Desk Lamp<")
    })
    .await;

    let updated = ctx
        .api
        .products()
        .into_iter()
        .find(|p| p.name == "Brass Lamp")
        .unwrap();
    assert_eq!(updated.display_id.as_deref(), Some("P-001"));
}

#[tokio::test]
async fn test_edit_modal_for_missing_row() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .get(ctx.live_url(&page, "/modal/99"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_row() {
    let (ctx, page) = signed_in().await;

    let resp = ctx
        .client
        .post(ctx.live_url(&page, "/products/2/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    ctx.wait_for_table(&page, |html| !html.contains("Standing Desk"))
        .await;
    assert_eq!(ctx.api.products().len(), 2);
}
