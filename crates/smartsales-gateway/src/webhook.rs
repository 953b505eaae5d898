//! # Webhook Verification
//!
//! ## Stripe-Signature Header
//! ```text
//! Stripe-Signature: t=1717430400,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//!                   │            │
//!                   │            └── hex(HMAC-SHA256(secret, "{t}.{raw body}"))
//!                   └── unix seconds when the provider signed the payload
//! ```
//!
//! A request is accepted when some `v1` entry matches and `t` is within
//! [`SIGNATURE_TOLERANCE_SECS`] of the local clock.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use smartsales_core::gateway::{GatewayError, GatewayEvent, GatewayEventKind};

/// Maximum age (either direction) of a signed payload.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Checks the signature header against the raw payload.
///
/// ## Arguments
/// * `now` - Unix seconds used for the replay window
pub fn verify_signature(payload: &[u8], sig_header: &str, secret: &str, now: i64) -> Result<(), GatewayError> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err(GatewayError::InvalidSignature("malformed header".to_string()));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| GatewayError::InvalidSignature("invalid timestamp".to_string()))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| GatewayError::InvalidSignature("HMAC key error".to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice compares in constant time
    let matched = signatures.iter().any(|sig| match hex::decode(sig) {
        Ok(bytes) => mac.clone().verify_slice(&bytes).is_ok(),
        Err(_) => false,
    });
    if !matched {
        return Err(GatewayError::InvalidSignature("signature mismatch".to_string()));
    }

    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(GatewayError::InvalidSignature("timestamp outside tolerance".to_string()));
    }

    Ok(())
}

/// Decodes a verified payload into the events reconciliation cares about.
pub fn parse_event(payload: &[u8]) -> Result<GatewayEvent, GatewayError> {
    let event: Value = serde_json::from_slice(payload).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    let id = event["id"]
        .as_str()
        .ok_or_else(|| GatewayError::Malformed("event missing id".to_string()))?
        .to_string();
    let event_type = event["type"]
        .as_str()
        .ok_or_else(|| GatewayError::Malformed("event missing type".to_string()))?;

    let object = &event["data"]["object"];
    let session_id = || {
        object["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GatewayError::Malformed("event missing data.object.id".to_string()))
    };

    let kind = match event_type {
        "checkout.session.completed" => GatewayEventKind::SessionCompleted {
            session_id: session_id()?,
            payment_intent_id: object["payment_intent"].as_str().map(String::from),
        },
        "checkout.session.expired" => GatewayEventKind::SessionExpired {
            session_id: session_id()?,
        },
        other => GatewayEventKind::Other(other.to_string()),
    };

    Ok(GatewayEvent { id, kind })
}
