//! Payment provider (Stripe) API client.
//!
//! Two responsibilities: creating checkout sessions (outbound, form-encoded
//! REST calls) and verifying inbound webhook signatures. The provider signs
//! webhooks with HMAC-SHA256 over `"{timestamp}.{raw body}"`, delivered in a
//! `stripe-signature: t=<ts>,v1=<hex>` header.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::StripeConfig;

/// Payment provider API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Maximum age of a webhook timestamp before the event is treated as a
/// replay (the provider redelivers with a fresh signature on retry).
const SIGNATURE_TOLERANCE_SECS: i64 = 5 * 60;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when interacting with the payment provider.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a provider response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Webhook signature verification failed.
    #[error("signature verification failed: {0}")]
    Signature(#[from] SignatureError),
}

/// Reasons a webhook signature fails verification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    /// Header is not of the form `t=<ts>,v1=<hex>`.
    #[error("malformed signature header")]
    MalformedHeader,

    /// Timestamp is outside the accepted tolerance window.
    #[error("timestamp outside tolerance")]
    StaleTimestamp,

    /// No candidate signature matched the expected MAC.
    #[error("signature mismatch")]
    Mismatch,
}

/// One line entry of a checkout session, already in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Display name shown on the provider's checkout page.
    pub name: String,
    /// Absolute image URL for the checkout page.
    pub image_url: String,
    /// Price per unit in minor currency units (cents).
    pub unit_amount: i64,
    /// Number of units.
    pub quantity: u32,
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Opaque session identifier - the join key to the local order row.
    pub id: String,
    /// Hosted checkout page to redirect the customer to.
    pub url: String,
}

/// Raw provider response for session creation.
#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: Option<String>,
}

/// Payment provider API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: SecretString,
    webhook_secret: SecretString,
    allowed_shipping_countries: Vec<String>,
}

impl StripeClient {
    /// Create a new payment provider client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
            allowed_shipping_countries: config.allowed_shipping_countries.clone(),
        }
    }

    /// Create a hosted checkout session for the given line items.
    ///
    /// Success and cancel URLs are scoped to `origin`; shipping-address
    /// collection is restricted to the configured country allow-list.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Api` for non-2xx provider responses,
    /// `StripeError::Http` for transport failures, and `StripeError::Parse`
    /// if the response has no redirect URL.
    pub async fn create_checkout_session(
        &self,
        line_items: &[LineItem],
        origin: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let params =
            checkout_session_params(line_items, origin, &self.allowed_shipping_countries);

        let response = self
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .header(
                "Authorization",
                format!("Bearer {}", self.secret_key.expose_secret()),
            )
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| StripeError::Parse("session has no redirect url".to_string()))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    /// Verify a webhook signature header against the raw request body.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::MalformedHeader` if the header cannot be
    /// parsed, `SignatureError::StaleTimestamp` if the signed timestamp is
    /// outside the tolerance window, and `SignatureError::Mismatch` if no
    /// candidate signature matches.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(), SignatureError> {
        let (timestamp, candidates) = parse_signature_header(signature_header)?;

        let age = Utc::now().timestamp() - timestamp;
        if age.abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(SignatureError::StaleTimestamp);
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.expose_secret().as_bytes())
            .map_err(|_| SignatureError::MalformedHeader)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        for candidate in candidates {
            let Ok(bytes) = hex::decode(&candidate) else {
                continue;
            };
            // verify_slice is constant-time; clone per candidate since it
            // consumes the state.
            if mac.clone().verify_slice(&bytes).is_ok() {
                return Ok(());
            }
        }

        Err(SignatureError::Mismatch)
    }
}

/// Parse a `t=<ts>,v1=<hex>` header into a timestamp and signature candidates.
fn parse_signature_header(header: &str) -> Result<(i64, Vec<String>), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                );
            }
            Some(("v1", value)) => candidates.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if candidates.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    Ok((timestamp, candidates))
}

/// Build the form-encoded parameter list for session creation.
///
/// The provider's REST API takes nested fields with indexed bracket keys.
fn checkout_session_params(
    line_items: &[LineItem],
    origin: &str,
    allowed_countries: &[String],
) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "payment_method_types[0]".to_string(),
            "card".to_string(),
        ),
        ("success_url".to_string(), format!("{origin}/success")),
        ("cancel_url".to_string(), format!("{origin}/checkout")),
    ];

    for (i, country) in allowed_countries.iter().enumerate() {
        params.push((
            format!("shipping_address_collection[allowed_countries][{i}]"),
            country.clone(),
        ));
    }

    for (i, item) in line_items.iter().enumerate() {
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            "usd".to_string(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][images][0]"),
            item.image_url.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        params.push((
            format!("line_items[{i}][quantity]"),
            item.quantity.to_string(),
        ));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> StripeClient {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_test_xxx"),
            webhook_secret: SecretString::from("whsec_test123secret456"),
            allowed_shipping_countries: vec!["US".to_string()],
        };
        StripeClient::new(&config)
    }

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_accepted() {
        let client = test_client();
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let timestamp = Utc::now().timestamp();
        let signature = sign(payload, "whsec_test123secret456", timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert_eq!(client.verify_webhook_signature(payload, &header), Ok(()));
    }

    #[test]
    fn wrong_secret_rejected() {
        let client = test_client();
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let timestamp = Utc::now().timestamp();
        let signature = sign(payload, "wrong_secret", timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert_eq!(
            client.verify_webhook_signature(payload, &header),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn tampered_payload_rejected() {
        let client = test_client();
        let original = br#"{"type":"checkout.session.completed"}"#;
        let tampered = br#"{"type":"checkout.session.completed","hacked":true}"#;
        let timestamp = Utc::now().timestamp();
        let signature = sign(original, "whsec_test123secret456", timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert_eq!(
            client.verify_webhook_signature(tampered, &header),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn stale_timestamp_rejected() {
        let client = test_client();
        let payload = br#"{"type":"checkout.session.completed"}"#;
        // 10 minutes old - beyond the 5-minute tolerance
        let timestamp = Utc::now().timestamp() - 600;
        let signature = sign(payload, "whsec_test123secret456", timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert_eq!(
            client.verify_webhook_signature(payload, &header),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn second_candidate_signature_accepted() {
        // Secret rotation: the provider sends one v1 per active secret.
        let client = test_client();
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let timestamp = Utc::now().timestamp();
        let stale = sign(payload, "old_rotated_secret", timestamp);
        let good = sign(payload, "whsec_test123secret456", timestamp);
        let header = format!("t={timestamp},v1={stale},v1={good}");

        assert_eq!(client.verify_webhook_signature(payload, &header), Ok(()));
    }

    #[test]
    fn malformed_headers_rejected() {
        let client = test_client();
        let payload = br#"{"type":"checkout.session.completed"}"#;

        for header in ["", "garbage", "t=1234567890", "v1=somesignature", "t=abc,v1=ff"] {
            assert_eq!(
                client.verify_webhook_signature(payload, header),
                Err(SignatureError::MalformedHeader),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn session_params_cover_all_fields() {
        let items = vec![LineItem {
            name: "Sevenfold Tee".to_string(),
            image_url: "https://shop.test/products/tee.jpg".to_string(),
            unit_amount: 2000,
            quantity: 2,
        }];
        let countries = vec!["US".to_string(), "CA".to_string()];
        let params = checkout_session_params(&items, "https://shop.test", &countries);

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("payment_method_types[0]"), Some("card"));
        assert_eq!(get("success_url"), Some("https://shop.test/success"));
        assert_eq!(get("cancel_url"), Some("https://shop.test/checkout"));
        assert_eq!(
            get("shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            get("shipping_address_collection[allowed_countries][1]"),
            Some("CA")
        );
        assert_eq!(
            get("line_items[0][price_data][currency]"),
            Some("usd")
        );
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("Sevenfold Tee")
        );
        assert_eq!(
            get("line_items[0][price_data][unit_amount]"),
            Some("2000")
        );
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
    }
}
