//! Cart route handlers.
//!
//! The cart lives in the session: every handler hydrates it from the session
//! store, applies one mutation, and writes the full item list back. Cart
//! mutations themselves cannot fail - an identity that matches nothing is a
//! no-op - so the only error surface here is the session store itself.

use axum::Json;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use sevenfold_core::{Cart, CartItem};

use crate::error::{AppError, Result};
use crate::models::session_keys;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image: String,
    pub line_total: Decimal,
}

/// Cart display data: items plus the derived total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Decimal,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id.clone(),
                    size: item.size.clone(),
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    image: item.image.clone(),
                    line_total: item.line_total(),
                })
                .collect(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Hydrate the cart from the session. An absent or unreadable value is an
/// empty cart.
async fn read_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the full cart back to the session.
async fn write_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(session_keys::CART, cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist cart: {e}")))
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default)]
    pub size: Option<String>,
    pub name: String,
    /// Unit price in the standard currency unit, e.g. 19.99.
    pub price: f64,
    #[serde(default)]
    pub quantity: Option<u32>,
    pub image: String,
}

/// Line reference for quantity / removal operations.
#[derive(Debug, Deserialize)]
pub struct LineRef {
    pub product_id: String,
    #[serde(default)]
    pub size: Option<String>,
}

/// Current cart with the derived total.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = read_cart(&session).await;
    Json(CartView::from(&cart))
}

/// Add an item, merging with an existing `(product_id, size)` line.
#[instrument(skip(session, request), fields(product_id = %request.product_id))]
pub async fn add(session: Session, Json(request): Json<AddToCartRequest>) -> Result<Json<CartView>> {
    let unit_price = Decimal::from_f64(request.price)
        .filter(|price| !price.is_sign_negative())
        .ok_or_else(|| AppError::BadRequest("Invalid price".to_string()))?;

    let mut cart = read_cart(&session).await;
    cart.add(CartItem {
        product_id: request.product_id,
        size: request.size,
        name: request.name,
        unit_price,
        quantity: request.quantity.unwrap_or(1),
        image: request.image,
    });
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Increase a line's quantity by 1.
#[instrument(skip(session, line), fields(product_id = %line.product_id))]
pub async fn increase(session: Session, Json(line): Json<LineRef>) -> Result<Json<CartView>> {
    let mut cart = read_cart(&session).await;
    cart.increase_quantity(&line.product_id, line.size.as_deref());
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Decrease a line's quantity by 1, removing the line when it hits 0.
#[instrument(skip(session, line), fields(product_id = %line.product_id))]
pub async fn decrease(session: Session, Json(line): Json<LineRef>) -> Result<Json<CartView>> {
    let mut cart = read_cart(&session).await;
    cart.decrease_quantity(&line.product_id, line.size.as_deref());
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a line outright.
#[instrument(skip(session, line), fields(product_id = %line.product_id))]
pub async fn remove(session: Session, Json(line): Json<LineRef>) -> Result<Json<CartView>> {
    let mut cart = read_cart(&session).await;
    cart.remove(&line.product_id, line.size.as_deref());
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = read_cart(&session).await;
    cart.clear();
    write_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_view_derives_totals() {
        let mut cart = Cart::new();
        cart.add(CartItem {
            product_id: "a".to_string(),
            size: Some("M".to_string()),
            name: "Shirt".to_string(),
            unit_price: "10.00".parse().expect("valid decimal"),
            quantity: 2,
            image: "a.jpg".to_string(),
        });

        let view = CartView::from(&cart);
        assert_eq!(view.total, "20.00".parse::<Decimal>().expect("valid decimal"));
        assert_eq!(view.item_count, 2);
        let line = view.items.first().expect("one line");
        assert_eq!(line.line_total, view.total);
    }
}
