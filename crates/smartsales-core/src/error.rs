//! # Domain Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ──► CoreError ──► ServiceError ──► ApiError ──► JSON  │
//! │  (bad input)         (rule         (smartsales-db)  (apps/api)          │
//! │                       broken)            ▲                              │
//! │                                          │                              │
//! │                      DbError ────────────┤                              │
//! │                      GatewayError ───────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A workflow that returns any of these has committed nothing.

use thiserror::Error;

// =============================================================================
// CoreError
// =============================================================================

/// A business rule said no.
#[derive(Debug, Error)]
pub enum CoreError {
    /// More units asked for than the product holds.
    ///
    /// Raised on cart writes, on checkout re-validation and on direct sales:
    /// ```text
    /// cart: Mouse × 3 ──► checkout ──► stock is now 2 ──► InsufficientStock
    ///                                                     (rollback, cart kept)
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("Cart is empty")]
    EmptyCart,

    /// The product exists but is not for sale.
    #[error("Product {0} is not active")]
    ProductInactive(String),

    /// The order/payment tables have no edge for this event.
    /// Reconciliation logs it and moves on; e.g. an expiry for a payment
    /// that already completed.
    #[error("Illegal {entity} transition from {from} on {event}")]
    IllegalTransition {
        entity: &'static str,
        from: String,
        event: String,
    },

    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// ValidationError
// =============================================================================

/// Request data rejected before any rule or query runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_and_transition_messages() {
        let short = CoreError::InsufficientStock {
            product: "Mouse".into(),
            available: 2,
            requested: 3,
        };
        assert_eq!(short.to_string(), "Insufficient stock for Mouse: available 2, requested 3");

        let illegal = CoreError::IllegalTransition {
            entity: "payment",
            from: "completed".into(),
            event: "session_expired".into(),
        };
        assert_eq!(
            illegal.to_string(),
            "Illegal payment transition from completed on session_expired"
        );
    }

    #[test]
    fn test_validation_messages() {
        let missing = ValidationError::Required { field: "prompt".into() };
        assert_eq!(missing.to_string(), "prompt is required");

        let range = ValidationError::OutOfRange {
            field: "quantity".into(),
            min: 1,
            max: 999,
        };
        assert_eq!(range.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_lifts_into_core_error() {
        let err: CoreError = ValidationError::MustBePositive { field: "amount".into() }.into();
        assert!(matches!(err, CoreError::Validation(ValidationError::MustBePositive { .. })));
    }
}
