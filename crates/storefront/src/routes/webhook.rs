//! Payment provider webhook handler.
//!
//! The provider delivers lifecycle events here, signed in production. In
//! development the same endpoint accepts an unsigned payload shaped
//! `{ "data": { "object": <session> } }` so the flow can be driven by the
//! CLI simulator. Both shapes are normalized by [`normalize`] into one
//! canonical value before any business logic runs.
//!
//! Only `checkout.session.completed` changes state; every other event type
//! is acknowledged and ignored. The state transition is an update filtered
//! on the unique session id: matching zero rows is a success, and replays
//! re-assert the same terminal state. That filter is the sole idempotency
//! mechanism - an "already processed" flag on top could only desync from it.
//!
//! Non-2xx responses cause the provider to redeliver; this handler adds no
//! retry logic of its own.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::order::CheckoutDetails;
use crate::services::payments::{SignatureError, StripeError};
use crate::state::AppState;

/// The only event type that transitions an order.
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A signed provider event envelope.
#[derive(Debug, Deserialize)]
pub struct ProviderEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// Unsigned development payload: `{ "data": { "object": <session> } }`.
#[derive(Debug, Deserialize)]
pub struct DevEventPayload {
    #[serde(default)]
    pub data: Option<EventData>,
}

/// The `data` member of either payload shape.
#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// The two inbound payload shapes, before normalization.
#[derive(Debug)]
pub enum WebhookPayload {
    Provider(ProviderEvent),
    Dev(DevEventPayload),
}

/// A checkout session as embedded in an event.
#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomerDetails {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<SessionAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionAddress {
    #[serde(default)]
    line1: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Result of normalizing an inbound payload.
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A completed checkout: apply the state transition.
    Completed {
        session_id: String,
        details: CheckoutDetails,
    },
    /// Any other event type: acknowledge and do nothing.
    Ignored,
}

/// Handle a payment provider webhook delivery.
///
/// # Errors
///
/// Returns 500 on signature verification failure, malformed payloads, or
/// database errors (the provider retries on non-2xx); 400 for a development
/// payload with no session object.
#[instrument(skip(state, headers, body))]
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let payload = if state.config().environment.requires_signed_webhooks() {
        let signature = headers
            .get("stripe-signature")
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Payment(StripeError::Signature(
                SignatureError::MalformedHeader,
            )))?;

        state
            .payments()
            .verify_webhook_signature(&body, signature)
            .map_err(StripeError::Signature)?;

        let event: ProviderEvent = serde_json::from_slice(&body)
            .map_err(|e| AppError::Internal(format!("malformed webhook event: {e}")))?;
        WebhookPayload::Provider(event)
    } else {
        let payload: DevEventPayload = serde_json::from_slice(&body)
            .map_err(|e| AppError::Internal(format!("malformed webhook payload: {e}")))?;
        WebhookPayload::Dev(payload)
    };

    match normalize(payload)? {
        WebhookOutcome::Completed {
            session_id,
            details,
        } => {
            let affected = OrderRepository::new(state.pool())
                .mark_paid(&session_id, &details)
                .await?;

            // Zero rows is a valid outcome: the event may reference a
            // session this store never recorded.
            tracing::info!(
                external_session_id = %session_id,
                rows_affected = affected,
                "Order updated from checkout completion"
            );
        }
        WebhookOutcome::Ignored => {
            tracing::debug!("Ignoring webhook event without state transition");
        }
    }

    Ok(Json(json!({ "received": true })))
}

/// Normalize either payload shape into the canonical outcome.
///
/// Every absent customer field becomes an empty string - the order row
/// stores `''`, never NULL.
fn normalize(payload: WebhookPayload) -> Result<WebhookOutcome> {
    let object = match payload {
        WebhookPayload::Provider(event) => {
            if event.event_type != CHECKOUT_COMPLETED {
                return Ok(WebhookOutcome::Ignored);
            }
            event.data.object
        }
        WebhookPayload::Dev(payload) => payload
            .data
            .map(|data| data.object)
            .ok_or_else(|| AppError::BadRequest("No session found".to_string()))?,
    };

    let session: SessionObject = serde_json::from_value(object)
        .map_err(|e| AppError::Internal(format!("malformed session object: {e}")))?;

    let details = session.customer_details.unwrap_or_default();
    let address = details.address.unwrap_or_default();

    Ok(WebhookOutcome::Completed {
        session_id: session.id,
        details: CheckoutDetails {
            customer_name: details.name.unwrap_or_default(),
            address_line: address.line1.unwrap_or_default(),
            city: address.city.unwrap_or_default(),
            state: address.state.unwrap_or_default(),
            postal_code: address.postal_code.unwrap_or_default(),
            country: address.country.unwrap_or_default(),
        },
    })
}
