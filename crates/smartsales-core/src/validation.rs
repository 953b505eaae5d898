//! # Validation Module
//!
//! Input validation utilities for SmartSales.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Quantities, amounts, prompts, identifiers                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Service transaction (smartsales-db)                          │
//! │  └── Stock re-validation against current rows                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  └── CHECK (stock >= 0), UNIQUE, foreign keys                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use uuid::Uuid;

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PROMPT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart or sale quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
///
/// ## Example
/// ```rust
/// use smartsales_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(5000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a payment amount in cents.
pub fn validate_amount_cents(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a report prompt.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_PROMPT_LENGTH`] characters
///
/// ## Returns
/// The trimmed prompt.
pub fn validate_prompt(prompt: &str) -> ValidationResult<String> {
    let prompt = prompt.trim();

    if prompt.is_empty() {
        return Err(ValidationError::Required {
            field: "prompt".to_string(),
        });
    }

    if prompt.chars().count() > MAX_PROMPT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "prompt".to_string(),
            max: MAX_PROMPT_LENGTH,
        });
    }

    Ok(prompt.to_string())
}

/// Validates an entity identifier (UUID).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    Uuid::parse_str(id.trim()).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Validates an ISO-4217 currency code (three ASCII letters).
pub fn validate_currency(currency: &str) -> ValidationResult<String> {
    let currency = currency.trim().to_ascii_lowercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter ISO code".to_string(),
        });
    }
    Ok(currency)
}

// =============================================================================
// Unit Tests
// =============================================================================
