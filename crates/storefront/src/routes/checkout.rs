//! Checkout session creation.
//!
//! Validates the submitted cart payload, creates a provider checkout session,
//! and records a `pending` order keyed by the session's id. The provider call
//! happens first: an orphaned local row referencing a nonexistent provider
//! session must never occur, while a provider session without a row is a
//! recoverable artifact if the insert fails afterwards.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use sevenfold_core::to_minor_units;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::services::payments::LineItem;
use crate::state::AppState;

/// One submitted cart line.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    pub image: String,
    /// Unit price in the standard currency unit, e.g. 19.99.
    pub price: f64,
    pub quantity: u32,
}

/// Successful response: the provider's hosted checkout URL.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Create a checkout session from the submitted cart items.
///
/// # Errors
///
/// Returns 400 if `cartItems` is missing, not an array, empty, or contains
/// malformed entries; 500 if the provider call or the order insert fails.
#[instrument(skip(state, headers, body))]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<CheckoutResponse>> {
    let items = parse_cart_items(&body)?;

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(state.config().base_url.as_str())
        .trim_end_matches('/')
        .to_string();

    let line_items = to_line_items(&items, &origin)?;

    // Provider first, database second: only a confirmed session gets a row.
    let session = state
        .payments()
        .create_checkout_session(&line_items, &origin)
        .await?;

    let order = OrderRepository::new(state.pool())
        .insert_pending(&session.id)
        .await?;

    tracing::info!(
        order_id = %order.id,
        external_session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}

/// Extract and validate the `cartItems` array from the request body.
fn parse_cart_items(body: &Value) -> Result<Vec<CheckoutItem>> {
    let invalid = || AppError::BadRequest("Invalid cart items".to_string());

    let items = body
        .get("cartItems")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?;

    if items.is_empty() {
        return Err(invalid());
    }

    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).map_err(|_| invalid()))
        .collect()
}

/// Convert validated cart items into provider line items.
///
/// Prices are converted to minor units here - `round(price * 100)`, half
/// away from zero - and images become absolute URLs under the caller's
/// origin.
fn to_line_items(items: &[CheckoutItem], origin: &str) -> Result<Vec<LineItem>> {
    items
        .iter()
        .map(|item| {
            let price = Decimal::from_f64(item.price)
                .ok_or_else(|| AppError::BadRequest("Invalid cart items".to_string()))?;
            let unit_amount = to_minor_units(price)
                .map_err(|e| AppError::BadRequest(format!("Invalid cart items: {e}")))?;

            Ok(LineItem {
                name: item.name.clone(),
                image_url: format!("{origin}/products/{}", item.image),
                unit_amount,
                quantity: item.quantity,
            })
        })
        .collect()
}
