//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (probes the database)
//!
//! # Cart (session-scoped JSON API)
//! GET  /cart                   - Current cart with derived total
//! POST /cart/add               - Add an item (merges by product/size)
//! POST /cart/increase          - Increase a line's quantity by 1
//! POST /cart/decrease          - Decrease by 1 (removes the line at 0)
//! POST /cart/remove            - Remove a line outright
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout
//! POST /checkout-session       - Create a provider checkout session and a
//!                                pending order; returns the redirect URL
//! GET  /orders/{session_id}    - Order confirmation lookup
//!
//! # Payments
//! POST /payment-webhook        - Provider webhook (signed in production,
//!                                unsigned dev payloads in development)
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout session creation
        .route("/checkout-session", post(checkout::create))
        // Order confirmation lookup
        .route("/orders/{session_id}", get(orders::show))
        // Payment provider webhook
        .route("/payment-webhook", post(webhook::handle))
}
