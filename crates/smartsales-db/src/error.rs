//! # Storage and Workflow Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error ──classify──► DbError ─┐                                   │
//! │                                     │                                   │
//! │  CoreError (rules) ─────────────────┼──► ServiceError ──► apps/api      │
//! │  GatewayError (Stripe) ─────────────┤    (transaction                   │
//! │  report query failure ──────────────┘     rolled back)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite reports constraint failures only as message text, so `DbError`
//! classifies them by prefix: `UNIQUE constraint failed: <table>.<col>`,
//! `FOREIGN KEY constraint failed`, `CHECK constraint failed: <expr>`.

use smartsales_core::gateway::GatewayError;
use smartsales_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `constraint` is SQLite's `<table>.<column>` list, e.g. `clients.email`.
    #[error("Duplicate value for {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// e.g. `stock >= 0`.
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A JSON column (order snapshot, metadata, report rows) did not round-trip.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    fn from_database_message(message: &str) -> Self {
        if let Some(constraint) = message.strip_prefix("UNIQUE constraint failed: ") {
            DbError::UniqueViolation {
                constraint: constraint.to_string(),
            }
        } else if message.starts_with("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation {
                message: message.to_string(),
            }
        } else if message.starts_with("CHECK constraint failed") {
            DbError::CheckViolation {
                message: message.to_string(),
            }
        } else {
            DbError::QueryFailed(message.to_string())
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => DbError::from_database_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Service Error
// =============================================================================

/// Why a workflow gave up. Its transaction has been rolled back.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A generated report query failed to run. Never retried.
    #[error("Report query failed: {0}")]
    QueryExecution(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(err.into())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(DbError::not_found("Payment", "abc").to_string(), "Payment not found: abc");
    }

    #[test]
    fn test_constraint_messages_are_classified() {
        assert!(matches!(
            DbError::from_database_message("UNIQUE constraint failed: clients.email"),
            DbError::UniqueViolation { constraint } if constraint == "clients.email"
        ));
        assert!(matches!(
            DbError::from_database_message("FOREIGN KEY constraint failed"),
            DbError::ForeignKeyViolation { .. }
        ));
        assert!(matches!(
            DbError::from_database_message("CHECK constraint failed: stock >= 0"),
            DbError::CheckViolation { .. }
        ));
        assert!(matches!(
            DbError::from_database_message("no such table: nope"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_validation_lifts_into_service_error() {
        let err: ServiceError = ValidationError::Required { field: "prompt".into() }.into();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }
}
