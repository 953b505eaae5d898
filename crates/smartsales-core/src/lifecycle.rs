//! # Order / Payment Lifecycle
//!
//! Transition tables for [`PaymentStatus`] and [`OrderStatus`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payment                                                                │
//! │                                                                         │
//! │   Pending ──SessionCompleted──► Completed ──Refunded──► Refunded        │
//! │      │                                                                  │
//! │      └─────SessionExpired─────► Failed ◄──SessionExpired (no-op)        │
//! │                                                                         │
//! │  Order                                                                  │
//! │                                                                         │
//! │   Pending ──StartProcessing──► Processing                               │
//! │      │                            │                                     │
//! │      ├──PaymentConfirmed──────────┴──► Completed                        │
//! │      └──PaymentFailed─────────────┬──► Cancelled                        │
//! │                  Processing ──────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every pair not drawn above is an [`CoreError::IllegalTransition`]. The
//! reconciliation workflows in smartsales-db consult these tables before
//! writing any status column.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::{OrderStatus, PaymentStatus};

// =============================================================================
// Payment
// =============================================================================

/// Something that happened to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEvent {
    /// Gateway reported the checkout session as paid.
    SessionCompleted,
    /// Gateway reported the checkout session as expired.
    SessionExpired,
    /// Money was returned to the client.
    Refunded,
}

impl fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentEvent::SessionCompleted => "session_completed",
            PaymentEvent::SessionExpired => "session_expired",
            PaymentEvent::Refunded => "refunded",
        })
    }
}

impl PaymentStatus {
    /// Next state after `event`.
    ///
    /// ## Example
    /// ```rust
    /// use smartsales_core::lifecycle::PaymentEvent;
    /// use smartsales_core::PaymentStatus;
    ///
    /// let next = PaymentStatus::Pending.apply(PaymentEvent::SessionCompleted).unwrap();
    /// assert_eq!(next, PaymentStatus::Completed);
    /// assert!(next.apply(PaymentEvent::SessionExpired).is_err());
    /// ```
    pub fn apply(self, event: PaymentEvent) -> CoreResult<PaymentStatus> {
        use PaymentEvent::*;
        use PaymentStatus::*;

        match (self, event) {
            (Pending, SessionCompleted) => Ok(Completed),
            (Pending, SessionExpired) => Ok(Failed),
            (Failed, SessionExpired) => Ok(Failed),
            (Completed, PaymentEvent::Refunded) => Ok(PaymentStatus::Refunded),
            (Completed, SessionCompleted)
            | (Completed, SessionExpired)
            | (Pending, PaymentEvent::Refunded)
            | (Failed, SessionCompleted)
            | (Failed, PaymentEvent::Refunded)
            | (PaymentStatus::Refunded, _) => Err(illegal("payment", self, event)),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// Something that happened to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    /// Fulfilment started before payment confirmation.
    StartProcessing,
    /// Linked payment completed.
    PaymentConfirmed,
    /// Linked payment failed or its session expired.
    PaymentFailed,
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderEvent::StartProcessing => "start_processing",
            OrderEvent::PaymentConfirmed => "payment_confirmed",
            OrderEvent::PaymentFailed => "payment_failed",
        })
    }
}

impl OrderStatus {
    /// Next state after `event`.
    pub fn apply(self, event: OrderEvent) -> CoreResult<OrderStatus> {
        use OrderEvent::*;
        use OrderStatus::*;

        match (self, event) {
            (Pending, StartProcessing) => Ok(Processing),
            (Pending, PaymentConfirmed) | (Processing, PaymentConfirmed) => Ok(Completed),
            (Pending, PaymentFailed) | (Processing, PaymentFailed) => Ok(Cancelled),
            (Cancelled, PaymentFailed) => Ok(Cancelled),
            (Processing, StartProcessing)
            | (Completed, _)
            | (Cancelled, StartProcessing)
            | (Cancelled, PaymentConfirmed) => Err(illegal("order", self, event)),
        }
    }
}

fn illegal(entity: &'static str, from: impl fmt::Display, event: impl fmt::Display) -> CoreError {
    CoreError::IllegalTransition {
        entity,
        from: from.to_string(),
        event: event.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
