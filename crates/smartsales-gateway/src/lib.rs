//! # smartsales-gateway: Stripe Adapter
//!
//! The only crate that talks to the payment provider.
//!
//! ## Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  smartsales-db services                                                 │
//! │       │   Arc<dyn PaymentGateway>   (trait lives in smartsales-core)    │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │            smartsales-gateway (THIS CRATE)                    │     │
//! │  │                                                               │     │
//! │  │   stripe.rs   POST /v1/checkout/sessions   (form encoded)     │     │
//! │  │               GET  /v1/checkout/sessions/{id}                 │     │
//! │  │   webhook.rs  Stripe-Signature: t=..,v1=..  → GatewayEvent    │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  api.stripe.com                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod stripe;
pub mod webhook;

pub use stripe::{StripeConfig, StripeGateway};
pub use webhook::{parse_event, verify_signature, SIGNATURE_TOLERANCE_SECS};

// The contract types, so callers need only this crate.
pub use smartsales_core::gateway::{
    CheckoutSession, GatewayError, GatewayEvent, GatewayEventKind, LineItem, PaymentGateway, SessionRequest,
    SessionStatus,
};
