//! Integration tests for the session-backed cart API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running
//!
//! Run with: cargo test -p sevenfold-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the storefront (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create a client with a cookie store so the session survives requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Test helper: add an item to the cart.
async fn add_item(client: &Client, product_id: &str, size: Option<&str>, quantity: u32) -> Value {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&json!({
            "product_id": product_id,
            "size": size,
            "name": format!("Shirt {product_id}"),
            "price": 10.00,
            "quantity": quantity,
            "image": format!("{product_id}.jpg"),
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("JSON body")
}

// ============================================================================
// Cart Mutation Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_add_derives_total() {
    let client = session_client();

    // [{price: 10.00, qty: 2}] totals 20.00
    let cart = add_item(&client, "tee-classic", None, 2).await;

    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["total"], "20.00");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_add_merges_same_product_and_size() {
    let client = session_client();

    add_item(&client, "tee-classic", Some("M"), 2).await;
    let cart = add_item(&client, "tee-classic", Some("M"), 3).await;

    let items = cart["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(cart["item_count"], 5);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_cart_survives_across_requests() {
    let base_url = storefront_base_url();
    let client = session_client();

    add_item(&client, "tee-classic", None, 1).await;

    // A separate request on the same session sees the persisted cart.
    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("JSON body");
    assert_eq!(cart["item_count"], 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_decrease_at_one_removes_line() {
    let base_url = storefront_base_url();
    let client = session_client();

    add_item(&client, "tee-classic", Some("L"), 1).await;

    let resp = client
        .post(format!("{base_url}/cart/decrease"))
        .json(&json!({ "product_id": "tee-classic", "size": "L" }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("JSON body");

    assert_eq!(cart["item_count"], 0);
    assert_eq!(cart["total"], "0");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_unknown_line_mutations_are_noops() {
    let base_url = storefront_base_url();
    let client = session_client();

    add_item(&client, "tee-classic", None, 1).await;

    for path in ["/cart/increase", "/cart/decrease", "/cart/remove"] {
        let resp = client
            .post(format!("{base_url}{path}"))
            .json(&json!({ "product_id": "no-such-product" }))
            .send()
            .await
            .expect("Request failed");
        assert_eq!(resp.status(), StatusCode::OK);
        let cart: Value = resp.json().await.expect("JSON body");
        assert_eq!(cart["item_count"], 1, "{path} should not change the cart");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_clear_empties_cart() {
    let base_url = storefront_base_url();
    let client = session_client();

    add_item(&client, "tee-classic", None, 2).await;
    add_item(&client, "tee-vintage", Some("S"), 1).await;

    let resp = client
        .post(format!("{base_url}/cart/clear"))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("JSON body");

    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["item_count"], 0);
}
