//! Order confirmation lookup.
//!
//! Backs the post-checkout success page. The webhook may still be in flight
//! when the customer lands here, so a `pending` status is a normal response,
//! not an error.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use sevenfold_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Public order confirmation data. Address fields stay server-side.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub customer_name: String,
}

/// Look up an order by its checkout-session id.
///
/// # Errors
///
/// Returns 404 if no order exists for the session id.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<OrderView>> {
    let order = OrderRepository::new(state.pool())
        .find_by_session(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(OrderView {
        id: order.id,
        status: order.status,
        customer_name: order.customer_name,
    }))
}
