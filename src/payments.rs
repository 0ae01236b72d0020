//! Stripe checkout sessions and webhook events.
//!
//! Only the two events that change a user's premium status are understood;
//! everything else is acknowledged and dropped.

use std::fmt;

use chrono::Duration;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, info};

use crate::{config::StripeConfig, errors::RequestError};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    pub fn from_id(id: &str) -> Option<Plan> {
        match id {
            "monthly" => Some(Plan::Monthly),
            "yearly" => Some(Plan::Yearly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Monthly => "monthly",
            Plan::Yearly => "yearly",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Plan::Monthly => Duration::days(30),
            Plan::Yearly => Duration::days(365),
        }
    }

    pub fn price_id(self, config: &StripeConfig) -> Option<&str> {
        match self {
            Plan::Monthly => config.monthly_price_id.as_deref(),
            Plan::Yearly => config.yearly_price_id.as_deref(),
        }
    }
}

// ----------------- Checkout -----------------

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

pub async fn create_checkout_session(
    client: &reqwest::Client,
    config: &StripeConfig,
    user_id: i64,
    plan: Plan,
) -> Result<CheckoutSession, RequestError> {
    let secret_key = config
        .secret_key
        .as_deref()
        .ok_or_else(|| RequestError::PaymentError("STRIPE_SECRET_KEY is not configured".into()))?;
    let price_id = plan
        .price_id(config)
        .ok_or(RequestError::BadRequest("Invalid plan selected"))?;

    let user_id = user_id.to_string();
    let success_url = format!(
        "{}/premium/success?session_id={{CHECKOUT_SESSION_ID}}",
        config.frontend_url
    );
    let cancel_url = format!("{}/premium", config.frontend_url);
    let form = [
        ("mode", "subscription"),
        ("payment_method_types[0]", "card"),
        ("line_items[0][price]", price_id),
        ("line_items[0][quantity]", "1"),
        ("success_url", success_url.as_str()),
        ("cancel_url", cancel_url.as_str()),
        ("client_reference_id", user_id.as_str()),
        ("metadata[plan_id]", plan.as_str()),
        ("subscription_data[metadata][user_id]", user_id.as_str()),
    ];

    let response = client
        .post(format!("{}/v1/checkout/sessions", config.api_base))
        .bearer_auth(secret_key)
        .form(&form)
        .send()
        .await
        .map_err(|e| RequestError::PaymentError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(RequestError::PaymentError(format!(
            "checkout session failed with {status}: {body}"
        )));
    }

    let session = response
        .json::<CheckoutSession>()
        .await
        .map_err(|e| RequestError::PaymentError(e.to_string()))?;
    info!(user_id = %user_id, plan = plan.as_str(), "Created checkout session");
    Ok(session)
}

// ----------------- Webhook Signature -----------------

#[derive(Debug, PartialEq, Eq)]
pub enum SignatureError {
    NotConfigured,
    InvalidKey,
    MalformedHeader,
    Expired,
    Mismatch,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::NotConfigured => write!(f, "webhook secret is not configured"),
            SignatureError::InvalidKey => write!(f, "webhook secret is not a valid key"),
            SignatureError::MalformedHeader => write!(f, "malformed signature header"),
            SignatureError::Expired => write!(f, "timestamp outside the tolerance zone"),
            SignatureError::Mismatch => write!(f, "no signatures found matching the payload"),
        }
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex signature Stripe would send for `payload` at `timestamp`.
pub fn compute_signature(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, SignatureError> {
    let mac = mac_for(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a `t=<unix>,v1=<hex>[,v1=<hex>...]` header against the raw body.
pub fn verify_signature(
    secret: Option<&str>,
    header: &str,
    payload: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let secret = secret.ok_or(SignatureError::NotConfigured)?;

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                )
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let mut matched = false;
    for signature in signatures {
        if let Ok(bytes) = hex::decode(signature) {
            if mac_for(secret, timestamp, payload)?
                .verify_slice(&bytes)
                .is_ok()
            {
                matched = true;
                break;
            }
        }
    }
    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

// ----------------- Webhook Events -----------------

#[derive(Debug, PartialEq, Eq)]
pub enum PaymentEvent {
    CheckoutCompleted {
        user_id: i64,
        plan: Plan,
        subscription_id: Option<String>,
    },
    SubscriptionDeleted {
        user_id: i64,
    },
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: Value,
}

fn user_id_from(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

pub fn parse_event(payload: &[u8]) -> Result<PaymentEvent, String> {
    let event: RawEvent = serde_json::from_slice(payload).map_err(|e| e.to_string())?;
    let object = &event.data.object;
    debug!(kind = %event.kind, "Received payment event");

    match event.kind.as_str() {
        "checkout.session.completed" => {
            let user_id = user_id_from(object.get("client_reference_id"))
                .ok_or("No user ID found in session")?;
            let plan = object
                .pointer("/metadata/plan_id")
                .and_then(Value::as_str)
                .and_then(Plan::from_id)
                .unwrap_or(Plan::Monthly);
            let subscription_id = object
                .get("subscription")
                .and_then(Value::as_str)
                .map(str::to_string);
            Ok(PaymentEvent::CheckoutCompleted {
                user_id,
                plan,
                subscription_id,
            })
        }
        "customer.subscription.deleted" => {
            let user_id = user_id_from(object.pointer("/metadata/user_id"))
                .ok_or("No user ID found in subscription")?;
            Ok(PaymentEvent::SubscriptionDeleted { user_id })
        }
        other => Ok(PaymentEvent::Ignored(other.to_string())),
    }
}
