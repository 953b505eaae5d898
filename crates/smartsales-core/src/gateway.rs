//! # Payment Gateway Contract
//!
//! The trait the checkout and reconciliation workflows depend on. The Stripe
//! implementation lives in `smartsales-gateway`; tests use in-process doubles.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout_cart ──create_session──►  PaymentGateway  ──► Stripe REST    │
//! │  poll_status   ──get_session─────►        │                            │
//! │  webhook       ──verify_webhook──►        │                            │
//! │                                           ▼                            │
//! │                                     GatewayEvent                        │
//! │                          SessionCompleted | SessionExpired | Other     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Requests / Responses
// =============================================================================

/// One priced line on the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub description: Option<String>,
    /// Price per unit in cents.
    pub unit_amount_cents: i64,
    pub quantity: i64,
}

/// Everything needed to open a checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub line_items: Vec<LineItem>,
    pub currency: String,
    /// Copied onto the session and echoed back in webhook events.
    pub metadata: BTreeMap<String, String>,
    pub customer_email: Option<String>,
}

/// A freshly created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// Hosted payment page the client is sent to.
    pub redirect_url: String,
}

/// Current state of a checkout session, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    /// Provider payment status (`paid`, `unpaid`, `no_payment_required`).
    pub payment_status: String,
    pub payment_intent_id: Option<String>,
    pub amount_total_cents: Option<i64>,
    pub currency: Option<String>,
}

impl SessionStatus {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// A verified webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub id: String,
    pub kind: GatewayEventKind,
}

/// The event kinds the reconciliation state machine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayEventKind {
    SessionCompleted {
        session_id: String,
        payment_intent_id: Option<String>,
    },
    SessionExpired {
        session_id: String,
    },
    /// Anything else. Accepted and ignored.
    Other(String),
}

// =============================================================================
// Errors
// =============================================================================

/// Payment gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Webhook signature header missing, malformed, mismatched or stale.
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Payload could not be understood.
    #[error("Malformed gateway payload: {0}")]
    Malformed(String),

    /// Transport failure talking to the provider.
    #[error("Gateway request failed: {0}")]
    Request(String),

    /// Provider answered with an error.
    #[error("Gateway rejected request ({status}): {message}")]
    Provider { status: u16, message: String },
}

// =============================================================================
// Trait
// =============================================================================

/// Payment provider adapter.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a hosted checkout session.
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession, GatewayError>;

    /// Fetches the current state of a session.
    async fn get_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;

    /// Verifies a webhook signature and decodes the event.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<GatewayEvent, GatewayError>;
}
