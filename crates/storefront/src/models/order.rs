//! Order model: the local record of a checkout attempt and its outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sevenfold_core::{OrderId, OrderStatus};

/// One checkout attempt.
///
/// `external_session_id` is the join key between the provider's checkout
/// session and this row. It is assigned once at creation and never
/// reassigned; the table enforces uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub external_session_id: String,
    pub customer_name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical customer/shipping details extracted from a webhook event.
///
/// Every field defaults to an empty string - the provider omits fields it
/// does not have, and the orders table stores `''`, never NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}
